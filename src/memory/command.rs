/*!
 * Commands and Outcomes
 *
 * Boundary types exchanged with the presentation layer. A presentation
 * layer sends a [`Command`], the session applies it and answers with an
 * [`Outcome`] carrying the resulting snapshot.
 *
 * Commands have a whitespace-separated text form:
 *
 * ```text
 * alloc <name> <size>     (also: allocate, add)
 * free <name>             (also: release, remove)
 * compact
 * relocate
 * swap <name>             (also: swapout)
 * ```
 *
 * and a JSON form: `{"op":"allocate","name":"A","size":300}`.
 */

use super::types::{InvalidInput, MemoryError, MemoryResult, Snapshot, SwapEntry};
use crate::core::data_structures::ProcessName;
use crate::core::types::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A mutating request against a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Allocate { name: String, size: Size },
    Free { name: String },
    Compact,
    Relocate,
    SwapOut { name: String },
}

impl Command {
    /// Short name used in logs and spans
    pub fn name(&self) -> &'static str {
        match self {
            Command::Allocate { .. } => "allocate",
            Command::Free { .. } => "free",
            Command::Compact => "compact",
            Command::Relocate => "relocate",
            Command::SwapOut { .. } => "swap_out",
        }
    }

    /// Parse the text form of a command
    pub fn parse(line: &str) -> MemoryResult<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| invalid(InvalidInput::MissingArgument("command".into())))?;

        let command = match verb.to_ascii_lowercase().as_str() {
            "alloc" | "allocate" | "add" => {
                let name = required(words.next(), "name")?;
                let size = parse_size(&required(words.next(), "size")?)?;
                Command::Allocate { name, size }
            }
            "free" | "release" | "remove" => Command::Free {
                name: required(words.next(), "name")?,
            },
            "compact" => Command::Compact,
            "relocate" => Command::Relocate,
            "swap" | "swapout" | "swap_out" => Command::SwapOut {
                name: required(words.next(), "name")?,
            },
            other => return Err(invalid(InvalidInput::UnknownCommand(other.to_string()))),
        };

        if let Some(extra) = words.next() {
            return Err(invalid(InvalidInput::UnexpectedArgument(extra.to_string())));
        }

        Ok(command)
    }
}

impl FromStr for Command {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Allocate { name, size } => write!(f, "alloc {} {}", name, size),
            Command::Free { name } => write!(f, "free {}", name),
            Command::Compact => write!(f, "compact"),
            Command::Relocate => write!(f, "relocate"),
            Command::SwapOut { name } => write!(f, "swap {}", name),
        }
    }
}

fn invalid(reason: InvalidInput) -> MemoryError {
    MemoryError::InvalidInput(reason)
}

fn required(word: Option<&str>, argument: &str) -> MemoryResult<String> {
    word.map(str::to_string)
        .ok_or_else(|| invalid(InvalidInput::MissingArgument(argument.to_string())))
}

/// Parse a user-entered size, distinguishing garbage from non-positive numbers
pub fn parse_size(raw: &str) -> MemoryResult<Size> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(InvalidInput::InvalidSize(raw.to_string())))?;
    if value <= 0 {
        return Err(invalid(InvalidInput::NonPositiveSize(value)));
    }
    Size::try_from(value).map_err(|_| invalid(InvalidInput::InvalidSize(raw.to_string())))
}

/// Result of a successful command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Allocated {
        name: ProcessName,
        size: Size,
        snapshot: Snapshot,
    },
    Freed {
        name: ProcessName,
        size: Size,
        snapshot: Snapshot,
    },
    Compacted {
        changed: bool,
        snapshot: Snapshot,
    },
    Relocated {
        changed: bool,
        snapshot: Snapshot,
    },
    SwappedOut {
        entry: SwapEntry,
        snapshot: Snapshot,
    },
}

impl Outcome {
    /// Layout after the command
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Outcome::Allocated { snapshot, .. }
            | Outcome::Freed { snapshot, .. }
            | Outcome::Compacted { snapshot, .. }
            | Outcome::Relocated { snapshot, .. }
            | Outcome::SwappedOut { snapshot, .. } => snapshot,
        }
    }

    /// Whether the layout differs from the one before the command
    ///
    /// Allocation, free and swap-out always change the layout when they
    /// succeed; compaction and relocation may be no-ops.
    pub fn changed(&self) -> bool {
        match self {
            Outcome::Compacted { changed, .. } | Outcome::Relocated { changed, .. } => *changed,
            _ => true,
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        match self {
            Outcome::Allocated { snapshot, .. }
            | Outcome::Freed { snapshot, .. }
            | Outcome::Compacted { snapshot, .. }
            | Outcome::Relocated { snapshot, .. }
            | Outcome::SwappedOut { snapshot, .. } => snapshot,
        }
    }
}

/*!
 * memsim - Interactive Entry Point
 *
 * Line-oriented terminal front end for the simulator. Reads one command per
 * line from stdin (text or JSON form), applies it to a single session and
 * renders the resulting layout.
 *
 * Usage: memsim [--json]
 */

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

use memsim::memory::{InvalidInput, MemoryInfo, MemoryPressure};
use memsim::{
    init_tracing, BlockKind, Command, LayoutObserver, MemoryConfig, MemoryError, MemoryManager,
    Outcome, Snapshot,
};

const BAR_WIDTH: usize = 64;

const HELP: &str = "\
commands:
  alloc <name> <size>   reserve memory for a process (first-fit)
  free <name>           release a process and merge free space
  compact               pack processes from offset 0
  relocate              move processes to their optimized placement
  swap <name>           evict a process to the swap area
  show | stats | swapped | help | quit
JSON commands are accepted too, e.g. {\"op\":\"allocate\",\"name\":\"A\",\"size\":300}";

/// Renders every new layout to the terminal
struct TerminalView {
    json: bool,
}

impl LayoutObserver for TerminalView {
    fn layout_changed(&self, outcome: &Outcome) {
        if self.json {
            match serde_json::to_string(outcome) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!(error = %e, "Failed to serialize outcome"),
            }
            return;
        }

        println!("{}", status_line(outcome));
        println!("{}", render_bar(outcome.snapshot()));
    }
}

fn status_line(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Allocated { name, size, .. } => format!("Process added: {} ({})", name, size),
        Outcome::Freed { name, size, .. } => format!("Process freed: {} ({})", name, size),
        Outcome::Compacted { changed: true, .. } => "Memory compacted".to_string(),
        Outcome::Compacted { changed: false, .. } => {
            "Memory already compact, no changes made".to_string()
        }
        Outcome::Relocated { changed: true, .. } => "Processes relocated".to_string(),
        Outcome::Relocated { changed: false, .. } => {
            "Layout already optimal, no changes made".to_string()
        }
        Outcome::SwappedOut { entry, .. } => format!("Process swapped out: {}", entry),
    }
}

/// One character per slice of the address space; free space is '.'
///
/// Every block gets at least one cell while room remains, and the bar never
/// exceeds `BAR_WIDTH` cells.
fn render_bar(snapshot: &Snapshot) -> String {
    let capacity = snapshot.capacity.max(1) as u128;
    let mut bar = String::with_capacity(BAR_WIDTH + 2);
    let mut drawn = 0;
    bar.push('|');
    for block in &snapshot.blocks {
        let share = (block.size as u128 * BAR_WIDTH as u128 / capacity) as usize;
        let width = share.max(1).min(BAR_WIDTH - drawn);
        let fill = match &block.kind {
            BlockKind::Free => '.',
            BlockKind::Occupied(name) => name.chars().next().unwrap_or('#'),
        };
        bar.extend(std::iter::repeat(fill).take(width));
        drawn += width;
    }
    bar.push('|');

    let legend: Vec<String> = snapshot.blocks.iter().map(|b| b.to_string()).collect();
    format!("{}\n{}", bar, legend.join(" "))
}

fn print_stats(manager: &MemoryManager) {
    let stats = manager.stats();
    println!(
        "Used: {} ({:.1}%) | Free: {} in {} blocks (largest {}) | Fragmentation: {:.0}% | Pressure: {}",
        stats.used_memory,
        stats.usage_percentage,
        stats.available_memory,
        stats.free_blocks,
        stats.largest_free_block,
        stats.external_fragmentation() * 100.0,
        stats.memory_pressure()
    );
    if stats.swapped_processes > 0 {
        println!(
            "Swap: {} processes, {} units",
            stats.swapped_processes, stats.swapped_memory
        );
    }
}

fn report_error(error: &MemoryError, json: bool) {
    if json {
        let line = serde_json::json!({ "error": error, "kind": error.kind() });
        println!("{}", line);
        return;
    }

    println!("Error: {}", error);
    if matches!(error, MemoryError::OutOfMemory { .. }) {
        if error.is_fragmentation() {
            println!("Hint: enough memory is free but fragmented; try 'compact' or 'relocate'");
        } else {
            println!("Hint: not enough free memory; try 'swap <name>' to evict a process");
        }
    }
}

fn parse_line(line: &str) -> Result<Command, MemoryError> {
    if line.starts_with('{') {
        serde_json::from_str(line)
            .map_err(|e| MemoryError::InvalidInput(InvalidInput::MalformedCommand(e.to_string())))
    } else {
        Command::parse(line)
    }
}

fn main() -> Result<()> {
    init_tracing();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");
    let config = MemoryConfig::from_env().context("invalid MEMSIM_* configuration")?;
    info!(capacity = config.capacity, json, "memsim starting");

    let manager = MemoryManager::with_config(config)
        .context("failed to create memory session")?
        .with_observer(Arc::new(TerminalView { json }));

    if !json {
        println!("{}", render_bar(&manager.snapshot()));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read command")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "show" => println!("{}", render_bar(&manager.snapshot())),
            "stats" => print_stats(&manager),
            "swapped" => {
                for entry in manager.swap_entries() {
                    println!("{}", entry);
                }
            }
            _ => match parse_line(line) {
                Ok(command) => {
                    if let Err(e) = manager.execute(&command) {
                        report_error(&e, json);
                    } else if !json && manager.pressure() >= MemoryPressure::High {
                        print_stats(&manager);
                    }
                }
                Err(e) => report_error(&e, json),
            },
        }
        stdout.flush().context("failed to flush stdout")?;
    }

    info!(
        commands = manager.commands_executed(),
        "memsim session finished"
    );
    Ok(())
}

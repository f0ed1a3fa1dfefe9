/*!
 * Process Names
 * Validated, inline-optimized names for resident processes
 */

use crate::memory::{InvalidInput, MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use std::fmt;

/// Name of a simulated process
///
/// A valid name is non-empty, is not made only of whitespace and contains
/// no control characters. Names are compared exactly; no trimming or case
/// folding is applied.
///
/// # Performance
///
/// Names up to 23 bytes are stored inline, which covers the short labels
/// ("A", "editor", "db-worker") a simulation session typically uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(transparent)]
pub struct ProcessName {
    inner: SmartString,
}

impl ProcessName {
    /// Validate and build a process name
    pub fn new(name: &str) -> MemoryResult<Self> {
        Self::validate(name)?;
        Ok(Self {
            inner: SmartString::from(name),
        })
    }

    /// Check a candidate name without allocating
    pub fn validate(name: &str) -> MemoryResult<()> {
        if name.trim().is_empty() {
            return Err(MemoryError::InvalidInput(InvalidInput::EmptyName));
        }
        if name.chars().any(char::is_control) {
            return Err(MemoryError::InvalidInput(InvalidInput::MalformedName(
                name.escape_default().to_string(),
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// Check if the name is stored inline (no heap allocation)
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.inner.is_inline()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl TryFrom<&str> for ProcessName {
    type Error = MemoryError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl TryFrom<String> for ProcessName {
    type Error = MemoryError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::validate(&name)?;
        Ok(Self {
            inner: SmartString::from(name),
        })
    }
}

impl From<ProcessName> for String {
    #[inline]
    fn from(name: ProcessName) -> Self {
        name.inner.into()
    }
}

impl AsRef<str> for ProcessName {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::ops::Deref for ProcessName {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl std::borrow::Borrow<str> for ProcessName {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for ProcessName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ProcessName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for ProcessName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

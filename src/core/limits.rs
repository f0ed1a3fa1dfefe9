/*!
 * Simulation Limits and Constants
 *
 * Centralized location for the simulator's defaults and thresholds.
 */

use std::num::NonZeroUsize;
use std::time::Duration;

// =============================================================================
// MEMORY
// =============================================================================

/// Default simulated capacity, in units
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be non-zero"),
};

/// Usage ratio at which pressure is reported as MEDIUM
pub const MEDIUM_PRESSURE_THRESHOLD: f64 = 0.60;

/// Usage ratio at which pressure is reported as HIGH
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

/// Usage ratio at which pressure is reported as CRITICAL
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.95;

// =============================================================================
// COMMANDS
// =============================================================================

/// Commands slower than this are logged as slow
pub const SLOW_COMMAND_THRESHOLD: Duration = Duration::from_millis(10);

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Overrides the simulated capacity
pub const ENV_CAPACITY: &str = "MEMSIM_CAPACITY";

/// Overrides the HIGH pressure threshold (ratio in 0..=1)
pub const ENV_WARNING_THRESHOLD: &str = "MEMSIM_WARNING_THRESHOLD";

/// Overrides the CRITICAL pressure threshold (ratio in 0..=1)
pub const ENV_CRITICAL_THRESHOLD: &str = "MEMSIM_CRITICAL_THRESHOLD";

/// Enables JSON log output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "MEMSIM_TRACE_JSON";

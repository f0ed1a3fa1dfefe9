/*!
 * Data Structures
 *
 * Specialized value types shared across the simulator:
 * - Process names stored inline when short
 */

mod process_name;

pub use process_name::ProcessName;

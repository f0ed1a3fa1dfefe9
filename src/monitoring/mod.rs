/*!
 * Monitoring
 * Structured logging and per-command tracing
 */

mod tracer;

pub use tracer::{init_tracing, CommandSpan};

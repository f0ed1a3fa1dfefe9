/*!
 * Command Tracing
 * Structured tracing for simulator commands using the tracing crate
 *
 * Features:
 * - Sequence numbers for correlating a command with its log lines
 * - JSON-formatted logs for structured parsing
 * - `log` records from the memory module forwarded into the same output
 * - Slow command warnings
 */

use crate::core::limits::{ENV_TRACE_JSON, SLOW_COMMAND_THRESHOLD};
use crate::core::types::CommandSeq;
use crate::memory::MemoryError;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MEMSIM_TRACE_JSON: Enable JSON output (default: false)
///
/// Calling it more than once is harmless; only the first call installs a
/// subscriber.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one command from submission to outcome
pub struct CommandSpan {
    span: tracing::Span,
    start: Instant,
    command: &'static str,
    seq: CommandSeq,
}

impl CommandSpan {
    pub fn new(command: &'static str, seq: CommandSeq) -> Self {
        let span = span!(
            Level::DEBUG,
            "command",
            seq = seq,
            command = command,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            changed = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        let _entered = span.enter();
        debug!(seq = seq, command = command, "command started");
        drop(_entered);

        Self {
            span,
            start: Instant::now(),
            command,
            seq,
        }
    }

    pub fn seq(&self) -> CommandSeq {
        self.seq
    }

    /// Record a successful command and whether it changed the layout
    pub fn record_outcome(&self, changed: bool) {
        self.span.record("result", "success");
        self.span.record("changed", changed);
    }

    /// Record a rejected command
    pub fn record_error(&self, error: &MemoryError) {
        self.span.record("result", "error");
        self.span.record("error", tracing::field::display(error));
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for CommandSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_COMMAND_THRESHOLD {
            warn!(
                seq = self.seq,
                command = self.command,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow command detected"
            );
        } else {
            debug!(
                seq = self.seq,
                command = self.command,
                duration_us = duration.as_micros() as u64,
                "command completed"
            );
        }
    }
}

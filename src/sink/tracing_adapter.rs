//! Tracing library adapter.

use std::io;

use crate::severity::LogLevel;
use crate::sink::LogOutput;

/// Output that forwards each emitted line to the `tracing` crate.
///
/// Lets a host that already runs a `tracing` subscriber fold these
/// diagnostics into its own log stream. Severe levels map onto
/// `tracing::error!`, the chattiest onto `tracing::trace!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutput;

impl TracingOutput {
    /// Create a tracing adapter
    pub fn new() -> Self {
        Self
    }
}

impl LogOutput for TracingOutput {
    fn write_line(&mut self, level: LogLevel, line: &str) -> io::Result<()> {
        match level {
            LogLevel::Off
            | LogLevel::Critical
            | LogLevel::Fatal
            | LogLevel::Assert
            | LogLevel::Error => tracing::error!(target: "instrumentation", "{}", line),
            LogLevel::Verify | LogLevel::Warn => tracing::warn!(target: "instrumentation", "{}", line),
            LogLevel::Info | LogLevel::Exception => tracing::info!(target: "instrumentation", "{}", line),
            LogLevel::Debug => tracing::debug!(target: "instrumentation", "{}", line),
            LogLevel::Trace | LogLevel::All => tracing::trace!(target: "instrumentation", "{}", line),
        }
        Ok(())
    }
}

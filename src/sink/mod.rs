//! Message sink
//!
//! Call sites build a message into one reused pending buffer and then ask
//! the sink to emit it at a level. Emission writes a single labelled line
//! to the output destination and clears the buffer. With no destination
//! configured the sink never writes anything, whatever the threshold.

mod output;
mod tracing_adapter;

pub use output::{LogOutput, MemoryOutput, WriterOutput};
pub use tracing_adapter::TracingOutput;

use std::fmt;
use std::time::Instant;

use crate::gate;
use crate::severity::LogLevel;

/// Pending-buffer plus output destination.
pub struct MessageSink {
    buffer: String,
    output: Option<Box<dyn LogOutput>>,
    /// Origin for the elapsed-milliseconds prefix, if enabled
    origin: Option<Instant>,
    write_failed: bool,
}

impl MessageSink {
    /// Create a sink writing to `output` (or nowhere)
    pub fn new(output: Option<Box<dyn LogOutput>>) -> Self {
        Self {
            buffer: String::new(),
            output,
            origin: None,
            write_failed: false,
        }
    }

    /// Prefix every emitted line with milliseconds elapsed since `origin`
    pub fn with_elapsed_prefix(mut self, origin: Instant) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Whether an output destination is attached
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Swap the output destination, returning the previous one
    pub fn set_output(&mut self, output: Option<Box<dyn LogOutput>>) -> Option<Box<dyn LogOutput>> {
        std::mem::replace(&mut self.output, output)
    }

    /// Append text to the pending buffer
    pub fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Text waiting to be emitted
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Drop pending text without emitting it
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take the pending text, leaving the buffer empty
    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Whether a message at `level` would be written under `threshold`
    #[inline]
    pub fn is_enabled(&self, threshold: LogLevel, level: LogLevel) -> bool {
        gate::level_visible(threshold, level) && self.output.is_some()
    }

    /// Emit the pending buffer at `level`.
    ///
    /// Returns `true` iff a line was written. When the level is disabled the
    /// buffer is left untouched; otherwise it is always cleared, even when
    /// the underlying write fails.
    pub fn emit(&mut self, threshold: LogLevel, level: LogLevel) -> bool {
        if !self.is_enabled(threshold, level) {
            return false;
        }
        let line = self.format_line(level);
        self.buffer.clear();

        let Some(output) = self.output.as_mut() else {
            return false;
        };
        match output.write_line(level, &line) {
            Ok(()) => true,
            Err(err) => {
                if !self.write_failed {
                    tracing::debug!(error = %err, "diagnostic output write failed");
                    self.write_failed = true;
                }
                false
            }
        }
    }

    fn format_line(&self, level: LogLevel) -> String {
        let mut line = String::with_capacity(self.buffer.len() + 16);
        if let Some(origin) = self.origin {
            line.push_str(&format!("{:>5}ms ", origin.elapsed().as_millis()));
        }
        line.push('[');
        line.push_str(level.label());
        line.push_str("] ");
        line.push_str(&self.buffer);
        line
    }
}

impl fmt::Debug for MessageSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSink")
            .field("pending", &self.buffer)
            .field("has_output", &self.output.is_some())
            .field("elapsed_prefix", &self.origin.is_some())
            .finish()
    }
}

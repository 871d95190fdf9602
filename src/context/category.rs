//! Per-module default category.

use super::Instrumentation;

/// Debug messages and timers bound to one category.
///
/// ```
/// use instrumentation::{Instrumentation, InstrumentationConfig, LogLevel, MemoryOutput};
///
/// let output = MemoryOutput::new();
/// let instr = Instrumentation::start(
///     InstrumentationConfig::default()
///         .with_threshold(LogLevel::Debug)
///         .with_category("journal")
///         .with_elapsed_prefix(false),
///     Some(Box::new(output.clone())),
/// );
/// let log = instr.category("journal.parse");
/// log.debug(|buf| buf.push_str("reading entries"));
/// assert_eq!(output.lines(), vec!["[DEBG] reading entries".to_string()]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CategoryLogger<'a> {
    instr: &'a Instrumentation,
    category: &'a str,
}

impl<'a> CategoryLogger<'a> {
    pub(super) fn new(instr: &'a Instrumentation, category: &'a str) -> Self {
        Self { instr, category }
    }

    /// Bound category
    pub fn category(&self) -> &str {
        self.category
    }

    /// Whether messages in this category are shown
    pub fn is_visible(&self) -> bool {
        self.instr.debug_visible(self.category)
    }

    /// Emit a debug message in this category
    pub fn debug<F>(&self, write: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        self.instr.debug(self.category, write)
    }

    /// Start a debug timer in this category
    pub fn start<F>(&self, name: &str, describe: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        self.instr.debug_start(name, self.category, describe)
    }

    /// Pause a debug timer in this category
    pub fn stop(&self, name: &str) -> bool {
        self.instr.debug_stop(name, self.category)
    }

    /// Finish a debug timer in this category
    pub fn finish(&self, name: &str) -> bool {
        self.instr.debug_finish(name, self.category)
    }
}

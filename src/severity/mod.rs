//! Severity model
//!
//! Totally ordered verbosity levels and the process-wide threshold that
//! decides which of them are eligible for output.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::InstrumentationError;

/// Verbosity level, ordered from least to most verbose.
///
/// A message at level `L` is eligible for output iff the configured
/// threshold is `>= L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum LogLevel {
    /// Nothing is shown
    Off = 0,
    /// Critical conditions
    Critical,
    /// Fatal errors
    Fatal,
    /// Assertion failures
    Assert,
    /// Errors
    Error,
    /// Verification failures
    Verify,
    /// Warnings
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Exceptions raised by the host
    Exception,
    /// Category-gated debugging output
    Debug,
    /// Depth-gated tracing output
    Trace,
    /// Everything
    All,
}

impl LogLevel {
    /// Every level, least verbose first.
    pub const ALL_LEVELS: [LogLevel; 12] = [
        LogLevel::Off,
        LogLevel::Critical,
        LogLevel::Fatal,
        LogLevel::Assert,
        LogLevel::Error,
        LogLevel::Verify,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Exception,
        LogLevel::Debug,
        LogLevel::Trace,
        LogLevel::All,
    ];

    /// User-facing label written in front of every emitted line.
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Off => "OFF",
            LogLevel::Critical => "CRIT",
            LogLevel::Fatal => "FATL",
            LogLevel::Assert => "ASRT",
            LogLevel::Error => "ERRR",
            LogLevel::Verify => "VERF",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Exception => "EXCP",
            LogLevel::Debug => "DEBG",
            LogLevel::Trace => "TRCE",
            LogLevel::All => "ALL",
        }
    }

    fn from_u8(raw: u8) -> LogLevel {
        Self::ALL_LEVELS
            .get(raw as usize)
            .copied()
            .unwrap_or(LogLevel::All)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LogLevel {
    type Err = InstrumentationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "off" => LogLevel::Off,
            "crit" | "critical" => LogLevel::Critical,
            "fatal" => LogLevel::Fatal,
            "assert" => LogLevel::Assert,
            "error" => LogLevel::Error,
            "verify" => LogLevel::Verify,
            "warn" | "warning" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "exception" | "except" => LogLevel::Exception,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            "all" => LogLevel::All,
            _ => return Err(InstrumentationError::InvalidLevel(s.to_string())),
        };
        Ok(level)
    }
}

/// Global enable threshold.
///
/// Read on every gated call site and written only at configuration time,
/// so it is a single atomic rather than a lock.
#[derive(Debug)]
pub struct Threshold {
    level: AtomicU8,
}

impl Threshold {
    /// Create a threshold at `level`
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Current threshold
    #[inline]
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Replace the threshold
    pub fn set(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a message at `level` passes the threshold alone.
    ///
    /// `Off` is never a message level, so it is never allowed.
    #[inline]
    pub fn allows(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && self.level.load(Ordering::Relaxed) >= level as u8
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

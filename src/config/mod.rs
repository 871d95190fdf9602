//! Instrumentation configuration
//!
//! The configuration boundary: everything that can be malformed (level
//! names, trace limits) is parsed and rejected here, so the core itself
//! never sees an invalid setting.

use crate::severity::LogLevel;
use crate::InstrumentationError;

/// Settings applied at start and on reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InstrumentationConfig {
    /// Most verbose level that is still shown
    pub threshold: LogLevel,

    /// Deepest trace level shown when the threshold reaches `Trace`
    pub trace_limit: u32,

    /// Prefix selecting debug categories; `None` hides all of them
    pub category: Option<String>,

    /// Enable object tracking and verification assertions
    pub verify: bool,

    /// Prefix emitted lines with milliseconds since start
    pub elapsed_prefix: bool,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            threshold: LogLevel::Warn,
            trace_limit: 0,
            category: None,
            verify: false,
            elapsed_prefix: true,
        }
    }
}

impl InstrumentationConfig {
    /// Everything off: no output is eligible and nothing is tracked
    pub fn silent() -> Self {
        Self {
            threshold: LogLevel::Off,
            ..Self::default()
        }
    }

    /// Map command-line style flags onto a configuration.
    ///
    /// Applied in order `verbose`, `debug`, `trace`, so the most verbose
    /// flag given wins the threshold. `trace` must be a non-negative
    /// integer depth.
    pub fn from_flags(
        verbose: bool,
        debug_category: Option<&str>,
        trace_level: Option<&str>,
        verify: bool,
    ) -> Result<Self, InstrumentationError> {
        let mut config = Self::default();

        if verbose {
            config.threshold = LogLevel::Info;
        }
        if let Some(category) = debug_category {
            config.threshold = LogLevel::Debug;
            config.category = Some(category.to_string());
        }
        if let Some(raw) = trace_level {
            config.threshold = LogLevel::Trace;
            config.trace_limit = parse_trace_limit(raw)?;
        }
        if verify {
            config.verify = true;
            config.threshold = config.threshold.max(LogLevel::Verify);
        }
        Ok(config)
    }

    /// Replace the threshold
    pub fn with_threshold(mut self, threshold: LogLevel) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replace the category filter
    pub fn with_category(mut self, prefix: impl Into<String>) -> Self {
        self.category = Some(prefix.into());
        self
    }

    /// Replace the trace limit
    pub fn with_trace_limit(mut self, limit: u32) -> Self {
        self.trace_limit = limit;
        self
    }

    /// Toggle verification and object tracking
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Toggle the elapsed-milliseconds line prefix
    pub fn with_elapsed_prefix(mut self, enabled: bool) -> Self {
        self.elapsed_prefix = enabled;
        self
    }
}

/// Parse a trace depth limit.
pub fn parse_trace_limit(raw: &str) -> Result<u32, InstrumentationError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| InstrumentationError::InvalidTraceLimit(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InstrumentationConfig::default();
        assert_eq!(config.threshold, LogLevel::Warn);
        assert_eq!(config.trace_limit, 0);
        assert!(config.category.is_none());
        assert!(!config.verify);
    }

    #[test]
    fn test_flags_most_verbose_wins() {
        let config =
            InstrumentationConfig::from_flags(true, Some("memory"), Some("3"), false).unwrap();
        assert_eq!(config.threshold, LogLevel::Trace);
        assert_eq!(config.trace_limit, 3);
        assert_eq!(config.category.as_deref(), Some("memory"));
    }

    #[test]
    fn test_verify_keeps_higher_threshold() {
        let config = InstrumentationConfig::from_flags(true, None, None, true).unwrap();
        assert!(config.verify);
        assert_eq!(config.threshold, LogLevel::Info);
    }

    #[test]
    fn test_malformed_trace_rejected() {
        for raw in ["", "deep", "-1", "2.5"] {
            assert!(
                matches!(
                    InstrumentationConfig::from_flags(false, None, Some(raw), false),
                    Err(InstrumentationError::InvalidTraceLimit(ref s)) if s == raw
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_trace_limit_tolerates_whitespace() {
        assert_eq!(parse_trace_limit(" 12 ").unwrap(), 12);
    }
}

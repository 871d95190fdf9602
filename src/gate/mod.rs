//! Category and trace gating
//!
//! Three independent predicates decide whether a message is worth
//! formatting at all:
//!
//! - trace messages pass when the threshold reaches `Trace` and the
//!   message depth is within the configured trace limit
//! - debug messages pass when the threshold reaches `Debug` and a
//!   category filter is configured whose prefix the category starts with
//! - every other level is gated by the threshold alone
//!
//! Category filtering is opt-in: with no filter configured, no
//! category-gated message is shown even at `Debug`. An empty filter
//! matches every category.

use crate::severity::LogLevel;

/// Prefix filter applied to debug categories.
///
/// Matching is case-sensitive and anchored at the start of the category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryFilter {
    prefix: String,
}

impl CategoryFilter {
    /// Filter on `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Filter that shows every category
    pub fn all() -> Self {
        Self::default()
    }

    /// Configured prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `category` is selected by this filter
    #[inline]
    pub fn matches(&self, category: &str) -> bool {
        category.starts_with(self.prefix.as_str())
    }
}

/// Whether a trace message at `depth` is visible.
#[inline]
pub fn trace_visible(threshold: LogLevel, trace_limit: u32, depth: u32) -> bool {
    threshold >= LogLevel::Trace && depth <= trace_limit
}

/// Whether a debug message in `category` is visible.
#[inline]
pub fn debug_visible(threshold: LogLevel, filter: Option<&CategoryFilter>, category: &str) -> bool {
    threshold >= LogLevel::Debug && filter.is_some_and(|f| f.matches(category))
}

/// Whether a plain leveled message is visible. `Off` never is.
#[inline]
pub fn level_visible(threshold: LogLevel, level: LogLevel) -> bool {
    level != LogLevel::Off && threshold >= level
}

//! Assertion boundary
//!
//! What happens after an invariant violation (abort, unwind, carry on) is
//! the host's decision. This module only describes the failure and hands
//! it to a hook the host installs.

use thiserror::Error;

/// A violated invariant, as reported by `instr_assert!`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Assertion failed in \"{file}\", line {line}: {call_site}: {condition}")]
pub struct AssertionFailure {
    /// Source text of the failed condition
    pub condition: String,
    /// Enclosing module or function
    pub call_site: String,
    /// Source file
    pub file: String,
    /// Source line
    pub line: u32,
}

impl AssertionFailure {
    /// Describe a failure
    pub fn new(condition: &str, call_site: &str, file: &str, line: u32) -> Self {
        Self {
            condition: condition.to_string(),
            call_site: call_site.to_string(),
            file: file.to_string(),
            line,
        }
    }
}

/// Host callback invoked on every assertion failure.
pub type FailureHook = Box<dyn Fn(&AssertionFailure) + Send + Sync>;

/// Check `cond`; on failure report it through the instrumentation's
/// failure hook.
///
/// ```
/// use instrumentation::{instr_assert, Instrumentation};
///
/// let instr = Instrumentation::disabled();
/// instr_assert!(instr, 1 + 1 == 2);
/// ```
#[macro_export]
macro_rules! instr_assert {
    ($instr:expr, $cond:expr $(,)?) => {
        if !($cond) {
            $instr.assertion_failed(stringify!($cond), module_path!(), file!(), line!());
        }
    };
}

/// Like [`instr_assert!`], but the condition is only evaluated while
/// verification is enabled. For checks too slow to run unconditionally.
#[macro_export]
macro_rules! instr_verify {
    ($instr:expr, $cond:expr $(,)?) => {{
        let instr = &$instr;
        if instr.verify_enabled() && !($cond) {
            instr.assertion_failed(stringify!($cond), module_path!(), file!(), line!());
        }
    }};
}

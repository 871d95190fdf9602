//! Formatting macros for gated call sites.
//!
//! Each macro formats its arguments only after the gate has passed, so a
//! disabled message never pays for `format_args!`.

/// Emit a message at an explicit level.
///
/// ```
/// use instrumentation::{diag_log, Instrumentation, LogLevel};
///
/// let instr = Instrumentation::disabled();
/// assert!(!diag_log!(instr, LogLevel::Info, "{} postings", 12));
/// ```
#[macro_export]
macro_rules! diag_log {
    ($instr:expr, $level:expr, $($arg:tt)*) => {
        $instr.log($level, |buf: &mut ::std::string::String| {
            let _ = ::std::fmt::Write::write_fmt(buf, format_args!($($arg)*));
        })
    };
}

/// Emit a `Critical` message
#[macro_export]
macro_rules! diag_critical {
    ($instr:expr, $($arg:tt)*) => {
        $crate::diag_log!($instr, $crate::LogLevel::Critical, $($arg)*)
    };
}

/// Emit a `Fatal` message
#[macro_export]
macro_rules! diag_fatal {
    ($instr:expr, $($arg:tt)*) => {
        $crate::diag_log!($instr, $crate::LogLevel::Fatal, $($arg)*)
    };
}

/// Emit an `Error` message
#[macro_export]
macro_rules! diag_error {
    ($instr:expr, $($arg:tt)*) => {
        $crate::diag_log!($instr, $crate::LogLevel::Error, $($arg)*)
    };
}

/// Emit a `Warn` message
#[macro_export]
macro_rules! diag_warn {
    ($instr:expr, $($arg:tt)*) => {
        $crate::diag_log!($instr, $crate::LogLevel::Warn, $($arg)*)
    };
}

/// Emit an `Info` message
#[macro_export]
macro_rules! diag_info {
    ($instr:expr, $($arg:tt)*) => {
        $crate::diag_log!($instr, $crate::LogLevel::Info, $($arg)*)
    };
}

/// Emit an `Exception` message
#[macro_export]
macro_rules! diag_exception {
    ($instr:expr, $($arg:tt)*) => {
        $crate::diag_log!($instr, $crate::LogLevel::Exception, $($arg)*)
    };
}

/// Emit a `Debug` message in a category
#[macro_export]
macro_rules! diag_debug {
    ($instr:expr, $category:expr, $($arg:tt)*) => {
        $instr.debug($category, |buf: &mut ::std::string::String| {
            let _ = ::std::fmt::Write::write_fmt(buf, format_args!($($arg)*));
        })
    };
}

/// Emit a `Trace` message at a depth
#[macro_export]
macro_rules! diag_trace {
    ($instr:expr, $depth:expr, $($arg:tt)*) => {
        $instr.trace($depth, |buf: &mut ::std::string::String| {
            let _ = ::std::fmt::Write::write_fmt(buf, format_args!($($arg)*));
        })
    };
}

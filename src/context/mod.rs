//! Process-wide instrumentation state
//!
//! One explicit context object holds the threshold, gating settings,
//! message sink, timer table, and object ledger. It is created by
//! [`Instrumentation::start`], shared by reference with every call site,
//! and torn down by [`Instrumentation::shutdown`].
//!
//! # Overhead when disabled
//!
//! Every gated call site checks atomics (threshold, output presence, trace
//! limit, timer count) before taking any lock or running the caller's
//! formatting closure. A disabled message costs a couple of relaxed loads.
//!
//! # Threading
//!
//! Each shared table sits behind its own mutex, so the context is
//! `Send + Sync`. Messages from concurrent threads never interleave
//! within a line, but ordering between threads is unspecified.

mod category;
mod macros;
mod timers;
mod tracking;

pub use category::CategoryLogger;
pub use tracking::ShutdownReport;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use crate::assertion::{AssertionFailure, FailureHook};
use crate::config::InstrumentationConfig;
use crate::gate::{self, CategoryFilter};
use crate::ledger::ObjectLedger;
use crate::severity::{LogLevel, Threshold};
use crate::sink::{LogOutput, MessageSink};
use crate::timer::{Clock, SystemClock, TimerRegistry};

/// Instrumentation context shared by all call sites.
pub struct Instrumentation {
    threshold: Threshold,
    trace_limit: AtomicU32,
    category: RwLock<Option<CategoryFilter>>,
    /// Mirrors `sink.has_output()` so the gate never locks the sink
    has_output: AtomicBool,
    verify: AtomicBool,
    sink: Mutex<MessageSink>,
    timers: Mutex<TimerRegistry>,
    /// Mirrors `timers.len()`
    active_timers: AtomicUsize,
    ledger: Mutex<ObjectLedger>,
    clock: Arc<dyn Clock>,
    failure_hook: RwLock<Option<FailureHook>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Instrumentation {
    /// Start instrumentation with `config`, writing to `output`.
    ///
    /// With `output` absent nothing is ever written, whatever the threshold.
    pub fn start(config: InstrumentationConfig, output: Option<Box<dyn LogOutput>>) -> Self {
        Self::start_with_clock(config, output, Arc::new(SystemClock))
    }

    /// Start with an explicit timestamp source for timers.
    pub fn start_with_clock(
        config: InstrumentationConfig,
        output: Option<Box<dyn LogOutput>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let has_output = output.is_some();
        let mut sink = MessageSink::new(output);
        if config.elapsed_prefix {
            sink = sink.with_elapsed_prefix(Instant::now());
        }

        let instr = Self {
            threshold: Threshold::new(config.threshold),
            trace_limit: AtomicU32::new(config.trace_limit),
            category: RwLock::new(config.category.map(CategoryFilter::new)),
            has_output: AtomicBool::new(has_output),
            verify: AtomicBool::new(config.verify),
            sink: Mutex::new(sink),
            timers: Mutex::new(TimerRegistry::new()),
            active_timers: AtomicUsize::new(0),
            ledger: Mutex::new(ObjectLedger::new()),
            clock,
            failure_hook: RwLock::new(None),
        };
        tracing::debug!(
            threshold = %instr.threshold(),
            trace_limit = instr.trace_limit(),
            verify = instr.verify_enabled(),
            has_output,
            "instrumentation started"
        );
        instr
    }

    /// Context with every gate closed and no output
    pub fn disabled() -> Self {
        Self::start(InstrumentationConfig::silent(), None)
    }

    /// Apply `config` to a running context.
    ///
    /// The output destination, timers, and ledger are left as they are.
    pub fn configure(&self, config: &InstrumentationConfig) {
        self.set_threshold(config.threshold);
        self.set_trace_limit(config.trace_limit);
        self.set_category_filter(config.category.as_deref().map(CategoryFilter::new));
        self.set_verify(config.verify);
    }

    // ----- severity -------------------------------------------------------

    /// Current threshold
    #[inline]
    pub fn threshold(&self) -> LogLevel {
        self.threshold.get()
    }

    /// Replace the threshold
    pub fn set_threshold(&self, level: LogLevel) {
        self.threshold.set(level);
    }

    /// Whether a message at `level` would be written
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.threshold.allows(level) && self.has_output.load(Ordering::Relaxed)
    }

    // ----- gating ---------------------------------------------------------

    /// Current trace depth limit
    pub fn trace_limit(&self) -> u32 {
        self.trace_limit.load(Ordering::Relaxed)
    }

    /// Replace the trace depth limit
    pub fn set_trace_limit(&self, limit: u32) {
        self.trace_limit.store(limit, Ordering::Relaxed);
    }

    /// Current category filter
    pub fn category_filter(&self) -> Option<CategoryFilter> {
        self.category
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the category filter; `None` hides every category
    pub fn set_category_filter(&self, filter: Option<CategoryFilter>) {
        *self
            .category
            .write()
            .unwrap_or_else(PoisonError::into_inner) = filter;
    }

    /// Whether a trace message at `depth` is visible
    #[inline]
    pub fn trace_visible(&self, depth: u32) -> bool {
        gate::trace_visible(self.threshold(), self.trace_limit(), depth)
    }

    /// Whether a debug message in `category` is visible
    pub fn debug_visible(&self, category: &str) -> bool {
        // Threshold first: below Debug the filter lock is never touched
        if !self.threshold.allows(LogLevel::Debug) {
            return false;
        }
        let filter = self.category.read().unwrap_or_else(PoisonError::into_inner);
        gate::debug_visible(self.threshold(), (*filter).as_ref(), category)
    }

    /// Handle for debug messages and timers in a fixed category
    pub fn category<'a>(&'a self, category: &'a str) -> CategoryLogger<'a> {
        CategoryLogger::new(self, category)
    }

    // ----- sink -----------------------------------------------------------

    /// Replace the output destination, returning the previous one
    pub fn set_output(&self, output: Option<Box<dyn LogOutput>>) -> Option<Box<dyn LogOutput>> {
        let mut sink = lock(&self.sink);
        self.has_output.store(output.is_some(), Ordering::Relaxed);
        sink.set_output(output)
    }

    /// Whether an output destination is attached
    pub fn has_output(&self) -> bool {
        self.has_output.load(Ordering::Relaxed)
    }

    /// Append text to the pending message
    pub fn append(&self, text: &str) {
        lock(&self.sink).append(text);
    }

    /// Emit the pending message at `level`; `true` iff a line was written
    pub fn emit(&self, level: LogLevel) -> bool {
        lock(&self.sink).emit(self.threshold(), level)
    }

    /// Emit a message at `level`, formatting it only if it will be shown.
    ///
    /// `write` receives a scratch buffer that is appended to the pending
    /// message; use `write!` on it or call `push_str`. The `diag_*!` macros
    /// wrap this. `write` runs before the sink is locked, so it may log
    /// through this context itself.
    pub fn log<F>(&self, level: LogLevel, write: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        if !self.is_enabled(level) {
            return false;
        }
        let mut text = String::new();
        write(&mut text);

        let mut sink = lock(&self.sink);
        sink.append(&text);
        sink.emit(self.threshold(), level)
    }

    /// Emit a trace message at `depth` if trace output reaches that deep
    pub fn trace<F>(&self, depth: u32, write: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        self.trace_visible(depth) && self.log(LogLevel::Trace, write)
    }

    /// Emit a debug message if `category` is selected by the filter
    pub fn debug<F>(&self, category: &str, write: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        self.debug_visible(category) && self.log(LogLevel::Debug, write)
    }

    /// Emit a multi-line block one line at a time at `level`
    pub fn log_lines<I, S>(&self, level: LogLevel, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.is_enabled(level) {
            return 0;
        }
        let threshold = self.threshold();
        let mut sink = lock(&self.sink);
        let mut written = 0;
        for line in lines {
            sink.clear();
            sink.append(line.as_ref());
            if sink.emit(threshold, level) {
                written += 1;
            }
        }
        written
    }

    // ----- assertions -----------------------------------------------------

    /// Whether verification (object tracking, `instr_verify!`) is on
    #[inline]
    pub fn verify_enabled(&self) -> bool {
        self.verify.load(Ordering::Relaxed)
    }

    /// Toggle verification
    pub fn set_verify(&self, enabled: bool) {
        self.verify.store(enabled, Ordering::Relaxed);
    }

    /// Install the host's fatal-failure hook
    pub fn set_failure_hook(&self, hook: FailureHook) {
        *self
            .failure_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Report a violated invariant.
    ///
    /// Emits an `Assert` line and calls the failure hook, if any. The
    /// failure is returned for callers that want to propagate it.
    pub fn assertion_failed(
        &self,
        condition: &str,
        call_site: &str,
        file: &str,
        line: u32,
    ) -> AssertionFailure {
        let failure = AssertionFailure::new(condition, call_site, file, line);
        self.log(LogLevel::Assert, |buf| buf.push_str(&failure.to_string()));

        let hook = self
            .failure_hook
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match hook.as_ref() {
            Some(hook) => hook(&failure),
            None => tracing::error!(%failure, "assertion failed with no failure hook installed"),
        }
        failure
    }
}

impl Default for Instrumentation {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumentation")
            .field("threshold", &self.threshold())
            .field("trace_limit", &self.trace_limit())
            .field("category", &self.category_filter())
            .field("has_output", &self.has_output())
            .field("verify", &self.verify_enabled())
            .field("active_timers", &self.active_timers.load(Ordering::Relaxed))
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

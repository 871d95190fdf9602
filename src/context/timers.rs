//! Timer call sites on the context.

use std::sync::atomic::Ordering;
use std::time::Duration;

use super::{lock, Instrumentation};
use crate::severity::LogLevel;
use crate::timer::TimerState;

impl Instrumentation {
    /// Start or resume timer `name` at `level`.
    ///
    /// A first start is skipped entirely when `level` is disabled. Resuming
    /// a paused timer ignores `level`. Returns whether the timer is running.
    pub fn start_timer(&self, name: &str, level: LogLevel) -> bool {
        self.start_timer_described(name, level, None)
    }

    fn start_timer_described(&self, name: &str, level: LogLevel, description: Option<String>) -> bool {
        let enabled = self.is_enabled(level);
        if !enabled && self.active_timers.load(Ordering::Relaxed) == 0 {
            return false;
        }

        let now = self.clock.now();
        let mut timers = lock(&self.timers);
        if !enabled && !timers.contains(name) {
            return false;
        }
        timers.start(name, level, description, now);
        self.active_timers.store(timers.len(), Ordering::Relaxed);
        true
    }

    /// Pause timer `name`; a no-op unless it is running
    pub fn stop_timer(&self, name: &str) -> bool {
        if self.active_timers.load(Ordering::Relaxed) == 0 {
            return false;
        }
        let now = self.clock.now();
        lock(&self.timers).stop(name, now)
    }

    /// Stop timer `name`, emit its summary at its captured level, and
    /// forget it.
    ///
    /// Returns `true` iff a summary line was written. Unknown timers are a
    /// no-op.
    pub fn finish_timer(&self, name: &str) -> bool {
        if self.active_timers.load(Ordering::Relaxed) == 0 {
            return false;
        }
        let now = self.clock.now();
        let summary = {
            let mut timers = lock(&self.timers);
            let summary = timers.finish(name, now);
            self.active_timers.store(timers.len(), Ordering::Relaxed);
            summary
        };

        match summary {
            Some(summary) => self.log(summary.level, |buf| buf.push_str(&summary.to_string())),
            None => false,
        }
    }

    /// Time accumulated so far by timer `name`
    pub fn timer_elapsed(&self, name: &str) -> Option<Duration> {
        let now = self.clock.now();
        lock(&self.timers).elapsed(name, now)
    }

    /// State of timer `name`, `None` when idle
    pub fn timer_state(&self, name: &str) -> Option<TimerState> {
        lock(&self.timers).state(name)
    }

    /// Start timer `name` at `Info` with a description, if `Info` is shown
    pub fn info_start<F>(&self, name: &str, describe: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        if !self.is_enabled(LogLevel::Info) {
            return false;
        }
        self.start_timer_described(name, LogLevel::Info, Some(describe_with(describe)))
    }

    /// Pause timer `name` if `Info` is shown
    pub fn info_stop(&self, name: &str) -> bool {
        self.is_enabled(LogLevel::Info) && self.stop_timer(name)
    }

    /// Finish timer `name` if `Info` is shown
    pub fn info_finish(&self, name: &str) -> bool {
        self.is_enabled(LogLevel::Info) && self.finish_timer(name)
    }

    /// Start timer `name` at `Debug` if `category` is selected
    pub fn debug_start<F>(&self, name: &str, category: &str, describe: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        if !self.debug_visible(category) {
            return false;
        }
        self.start_timer_described(name, LogLevel::Debug, Some(describe_with(describe)))
    }

    /// Pause timer `name` if `category` is selected
    pub fn debug_stop(&self, name: &str, category: &str) -> bool {
        self.debug_visible(category) && self.stop_timer(name)
    }

    /// Finish timer `name` if `category` is selected
    pub fn debug_finish(&self, name: &str, category: &str) -> bool {
        self.debug_visible(category) && self.finish_timer(name)
    }

    /// Start timer `name` at `Trace` if trace output reaches `depth`
    pub fn trace_start<F>(&self, name: &str, depth: u32, describe: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        if !self.trace_visible(depth) {
            return false;
        }
        self.start_timer_described(name, LogLevel::Trace, Some(describe_with(describe)))
    }

    /// Pause timer `name` if trace output reaches `depth`
    pub fn trace_stop(&self, name: &str, depth: u32) -> bool {
        self.trace_visible(depth) && self.stop_timer(name)
    }

    /// Finish timer `name` if trace output reaches `depth`
    pub fn trace_finish(&self, name: &str, depth: u32) -> bool {
        self.trace_visible(depth) && self.finish_timer(name)
    }
}

fn describe_with<F: FnOnce(&mut String)>(describe: F) -> String {
    let mut description = String::new();
    describe(&mut description);
    description
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::InstrumentationConfig;
    use crate::severity::LogLevel;
    use crate::sink::MemoryOutput;
    use crate::timer::{ManualClock, TimerState};
    use crate::Instrumentation;

    fn timed(config: InstrumentationConfig) -> (Instrumentation, MemoryOutput, Arc<ManualClock>) {
        let output = MemoryOutput::new();
        let clock = Arc::new(ManualClock::new());
        let instr = Instrumentation::start_with_clock(
            config.with_elapsed_prefix(false),
            Some(Box::new(output.clone())),
            clock.clone(),
        );
        (instr, output, clock)
    }

    #[test]
    fn test_finish_emits_at_captured_level() {
        let (instr, output, clock) = timed(InstrumentationConfig::default().with_threshold(LogLevel::Info));
        assert!(instr.start_timer("load", LogLevel::Info));
        clock.advance(Duration::from_millis(4));
        assert!(instr.finish_timer("load"));
        assert_eq!(output.lines(), vec!["[INFO] load: 4.000ms".to_string()]);
    }

    #[test]
    fn test_disabled_first_start_is_skipped() {
        let (instr, output, _clock) = timed(InstrumentationConfig::default());
        assert!(!instr.start_timer("quiet", LogLevel::Info));
        assert_eq!(instr.timer_state("quiet"), None);
        assert!(!instr.finish_timer("quiet"));
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_paused_timer_resumes_after_threshold_drop() {
        let (instr, _output, clock) =
            timed(InstrumentationConfig::default().with_threshold(LogLevel::Info));
        instr.start_timer("t", LogLevel::Info);
        clock.advance(Duration::from_millis(3));
        instr.stop_timer("t");

        instr.set_threshold(LogLevel::Warn);
        assert!(instr.start_timer("t", LogLevel::Info));
        assert_eq!(instr.timer_state("t"), Some(TimerState::Running));
        clock.advance(Duration::from_millis(2));
        assert_eq!(instr.timer_elapsed("t"), Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_info_start_description() {
        let (instr, output, clock) =
            timed(InstrumentationConfig::default().with_threshold(LogLevel::Info));
        assert!(instr.info_start("parse", |buf| buf.push_str("Parsed journal")));
        clock.advance(Duration::from_millis(12));
        assert!(instr.info_finish("parse"));
        assert_eq!(
            output.lines(),
            vec!["[INFO] Parsed journal (12.000ms)".to_string()]
        );
    }

    #[test]
    fn test_debug_timers_follow_category() {
        let (instr, output, clock) = timed(
            InstrumentationConfig::default()
                .with_threshold(LogLevel::Debug)
                .with_category("journal"),
        );
        assert!(!instr.debug_start("xacts", "report", |_| {}));
        assert!(instr.debug_start("xacts", "journal.parse", |buf| buf.push_str("Transactions:")));
        clock.advance(Duration::from_millis(1));
        assert!(instr.debug_finish("xacts", "journal.parse"));
        assert_eq!(output.lines(), vec!["[DEBG] Transactions: 1.000ms".to_string()]);
    }

    #[test]
    fn test_trace_timers_follow_depth() {
        let (instr, output, _clock) = timed(
            InstrumentationConfig::default()
                .with_threshold(LogLevel::Trace)
                .with_trace_limit(2),
        );
        assert!(!instr.trace_start("deep", 3, |_| {}));
        assert!(instr.trace_start("shallow", 2, |_| {}));
        assert!(instr.trace_finish("shallow", 2));
        assert_eq!(output.lines().len(), 1);
    }

    #[test]
    fn test_finish_twice_emits_once() {
        let (instr, output, _clock) =
            timed(InstrumentationConfig::default().with_threshold(LogLevel::Info));
        instr.start_timer("once", LogLevel::Info);
        assert!(instr.finish_timer("once"));
        assert!(!instr.finish_timer("once"));
        assert_eq!(output.lines().len(), 1);
    }
}

//! Named cumulative timers
//!
//! Each timer name moves through `Idle -> Running -> Paused -> Running ...`
//! and finally `Finished`, at which point its entry is removed and a
//! summary is handed back for emission. Elapsed time accumulates across
//! every run between the first start and the finish.
//!
//! Misuse is never an error: stopping an idle or paused timer, starting a
//! running one, and finishing an unknown one are all no-ops.

mod clock;
mod format;

pub use clock::{Clock, ManualClock, SystemClock};
pub use format::format_duration;

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::severity::LogLevel;

/// Observable state of a registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Currently accumulating
    Running,
    /// Registered, not accumulating
    Paused,
}

/// One named timer.
#[derive(Debug, Clone)]
struct TimerEntry {
    /// Level captured at first start; resumes never change it
    level: LogLevel,
    description: Option<String>,
    elapsed: Duration,
    running_since: Option<Instant>,
}

impl TimerEntry {
    fn state(&self) -> TimerState {
        if self.running_since.is_some() {
            TimerState::Running
        } else {
            TimerState::Paused
        }
    }

    fn total_at(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.elapsed + now.saturating_duration_since(since),
            None => self.elapsed,
        }
    }
}

/// Final report of a finished timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSummary {
    /// Timer name
    pub name: String,
    /// Level the timer was started at
    pub level: LogLevel,
    /// Description supplied at first start
    pub description: Option<String>,
    /// Total accumulated time
    pub elapsed: Duration,
}

impl fmt::Display for TimerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spent = format_duration(self.elapsed);
        match self.description.as_deref() {
            None | Some("") => write!(f, "{}: {}", self.name, spent),
            Some(desc) if desc.ends_with(':') => write!(f, "{} {}", desc, spent),
            Some(desc) => write!(f, "{} ({})", desc, spent),
        }
    }
}

/// Table of live timers keyed by case-sensitive name.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    entries: HashMap<String, TimerEntry>,
}

impl TimerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Start or resume `name`.
    ///
    /// A new timer captures `level` and `description`; resuming a paused
    /// timer keeps the originals. Starting a running timer does nothing.
    pub fn start(
        &mut self,
        name: &str,
        level: LogLevel,
        description: Option<String>,
        now: Instant,
    ) -> TimerState {
        match self.entries.get_mut(name) {
            Some(entry) => {
                if entry.running_since.is_none() {
                    entry.running_since = Some(now);
                }
            }
            None => {
                self.entries.insert(
                    name.to_string(),
                    TimerEntry {
                        level,
                        description,
                        elapsed: Duration::ZERO,
                        running_since: Some(now),
                    },
                );
            }
        }
        TimerState::Running
    }

    /// Pause `name`, folding the current run into its total.
    ///
    /// Returns `true` if a running timer was paused.
    pub fn stop(&mut self, name: &str, now: Instant) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        match entry.running_since.take() {
            Some(since) => {
                entry.elapsed += now.saturating_duration_since(since);
                true
            }
            None => false,
        }
    }

    /// Stop `name`, remove it, and return its summary.
    ///
    /// Unknown names yield `None`.
    pub fn finish(&mut self, name: &str, now: Instant) -> Option<TimerSummary> {
        self.stop(name, now);
        let (name, entry) = self.entries.remove_entry(name)?;
        Some(TimerSummary {
            name,
            level: entry.level,
            description: entry.description,
            elapsed: entry.elapsed,
        })
    }

    /// State of `name`, or `None` when idle
    pub fn state(&self, name: &str) -> Option<TimerState> {
        self.entries.get(name).map(TimerEntry::state)
    }

    /// Whether `name` is registered (running or paused)
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Time accumulated by `name` so far, including any current run
    pub fn elapsed(&self, name: &str, now: Instant) -> Option<Duration> {
        self.entries.get(name).map(|entry| entry.total_at(now))
    }

    /// Level captured when `name` was first started
    pub fn level(&self, name: &str) -> Option<LogLevel> {
        self.entries.get(name).map(|entry| entry.level)
    }

    /// Number of registered timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of registered timers, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every timer without reporting
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

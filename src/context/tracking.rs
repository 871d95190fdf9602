//! Object tracking and shutdown.

use std::io;
use std::mem;
use std::sync::PoisonError;

use super::{lock, Instrumentation};
use crate::ledger::{MemoryReport, ObjectId};
use crate::severity::LogLevel;
use crate::InstrumentationError;

/// What was still outstanding when the context shut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tracked objects never reported destroyed
    pub outstanding_objects: usize,
    /// Bytes held by those objects
    pub outstanding_bytes: usize,
    /// Highest live byte count seen
    pub peak_bytes: usize,
    /// Timers started but never finished
    pub unfinished_timers: Vec<String>,
}

impl ShutdownReport {
    /// Whether nothing was left behind
    pub fn is_clean(&self) -> bool {
        self.outstanding_objects == 0 && self.unfinished_timers.is_empty()
    }
}

/// Short type name: module path stripped from the outer type.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let outer_end = full.find('<').unwrap_or(full.len());
    match full[..outer_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

impl Instrumentation {
    /// Record construction of object `id`.
    ///
    /// Always records, whatever the verification setting. Fails if `id` is
    /// already live.
    pub fn record_construction(
        &self,
        id: ObjectId,
        type_name: &str,
        size: usize,
        args: &str,
    ) -> Result<(), InstrumentationError> {
        lock(&self.ledger).record_construction(id, type_name, size, args)
    }

    /// Record destruction of object `id`; untracked ids are ignored.
    ///
    /// Returns whether a record was removed.
    pub fn record_destruction(&self, id: ObjectId, type_name: &str, size: usize) -> bool {
        lock(&self.ledger)
            .record_destruction(id, type_name, size)
            .is_some()
    }

    /// Record construction of a `T` at `id` while verification is on.
    ///
    /// Type name and size come from `T`. A free no-op when verification
    /// is off.
    pub fn track<T>(&self, id: ObjectId, args: &str) -> Result<(), InstrumentationError> {
        if !self.verify_enabled() {
            return Ok(());
        }
        self.record_construction(id, short_type_name::<T>(), mem::size_of::<T>(), args)
    }

    /// Record destruction of a `T` at `id` while verification is on
    pub fn untrack<T>(&self, id: ObjectId) -> bool {
        if !self.verify_enabled() {
            return false;
        }
        self.record_destruction(id, short_type_name::<T>(), mem::size_of::<T>())
    }

    /// Bytes held by live tracked objects
    pub fn current_bytes(&self) -> usize {
        lock(&self.ledger).current_bytes()
    }

    /// Number of live tracked objects
    pub fn current_count(&self) -> usize {
        lock(&self.ledger).current_count()
    }

    /// Grouped memory report
    pub fn memory_report(&self, include_all: bool) -> MemoryReport {
        lock(&self.ledger).report(include_all)
    }

    /// Write the grouped memory report to `out`
    pub fn write_memory_report<W: io::Write>(&self, out: &mut W, include_all: bool) -> io::Result<()> {
        lock(&self.ledger).write_report(out, include_all)
    }

    /// Emit the grouped memory report through the sink at `level`
    pub fn emit_memory_report(&self, level: LogLevel, include_all: bool) -> usize {
        if !self.is_enabled(level) {
            return 0;
        }
        let report = self.memory_report(include_all);
        self.log_lines(level, report.lines())
    }

    /// Tear the context down.
    ///
    /// Before releasing the ledger, emits a memory report when asked for
    /// by the `memory.counts` (full) or `memory.counts.live` (live only)
    /// debug categories, or as a warning when tracked objects are still
    /// live.
    pub fn shutdown(self) -> ShutdownReport {
        if self.debug_visible("memory.counts") {
            self.emit_memory_report(LogLevel::Debug, true);
        } else if self.debug_visible("memory.counts.live") {
            self.emit_memory_report(LogLevel::Debug, false);
        } else if self.current_count() > 0 {
            self.emit_memory_report(LogLevel::Warn, false);
        }

        let unfinished_timers = lock(&self.timers).names();
        let ledger = self.ledger.into_inner().unwrap_or_else(PoisonError::into_inner);
        let report = ShutdownReport {
            outstanding_objects: ledger.current_count(),
            outstanding_bytes: ledger.current_bytes(),
            peak_bytes: ledger.peak_bytes(),
            unfinished_timers,
        };

        if report.is_clean() {
            tracing::debug!(peak_bytes = report.peak_bytes, "instrumentation shut down");
        } else {
            tracing::warn!(
                objects = report.outstanding_objects,
                bytes = report.outstanding_bytes,
                timers = report.unfinished_timers.len(),
                "instrumentation shut down with outstanding records"
            );
        }
        report
    }
}

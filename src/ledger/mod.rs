//! Object and memory ledger
//!
//! Bookkeeping registry correlating live application objects with their
//! type, byte size, and construction arguments. The ledger never owns the
//! objects it tracks: owners report construction and destruction, and the
//! ledger keeps metadata keyed by an opaque identity.
//!
//! The two failure modes are deliberately asymmetric. Constructing the
//! same identity twice is a bookkeeping bug and is reported as an error.
//! Destroying an identity that was never recorded is expected under
//! partial instrumentation and is silently ignored.

mod report;

pub use report::{CtorCount, MemoryReport, TypeGroup};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;

use crate::InstrumentationError;

/// Opaque identity of a tracked object.
///
/// Not reused while its record is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Identity from an explicit token
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Identity from the address of `value`
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self(value as *const T as *const () as usize as u64)
    }

    /// Raw token
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Metadata recorded for one live object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedObject {
    /// Declared type name
    pub type_name: String,
    /// Size in bytes
    pub size: usize,
    /// Free-form description of the construction arguments
    pub args: String,
}

/// Running count and byte total for one type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    count: usize,
    bytes: usize,
}

/// Registry of live tracked objects plus construction history.
#[derive(Debug, Default)]
pub struct ObjectLedger {
    live: HashMap<ObjectId, TrackedObject>,
    live_bytes: usize,
    peak_bytes: usize,
    /// Every construction ever recorded, by type
    history: BTreeMap<String, Tally>,
    /// Every construction ever recorded, by (type, args)
    ctor_counts: BTreeMap<(String, String), usize>,
}

impl ObjectLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the birth of object `id`.
    ///
    /// Fails with [`InstrumentationError::DuplicateIdentity`] if `id` is
    /// already live; the existing record is left untouched.
    pub fn record_construction(
        &mut self,
        id: ObjectId,
        type_name: &str,
        size: usize,
        args: &str,
    ) -> Result<(), InstrumentationError> {
        if let Some(existing) = self.live.get(&id) {
            tracing::error!(
                %id,
                existing = %existing.type_name,
                incoming = type_name,
                "object constructed twice at the same identity"
            );
            return Err(InstrumentationError::DuplicateIdentity {
                id,
                type_name: type_name.to_string(),
            });
        }

        self.live.insert(
            id,
            TrackedObject {
                type_name: type_name.to_string(),
                size,
                args: args.to_string(),
            },
        );
        self.live_bytes = self.live_bytes.saturating_add(size);
        self.peak_bytes = self.peak_bytes.max(self.live_bytes);

        let tally = self.history.entry(type_name.to_string()).or_default();
        tally.count += 1;
        tally.bytes = tally.bytes.saturating_add(size);
        *self
            .ctor_counts
            .entry((type_name.to_string(), args.to_string()))
            .or_default() += 1;
        Ok(())
    }

    /// Record the death of object `id`.
    ///
    /// Returns the removed record, or `None` if `id` was never tracked.
    /// The aggregate is reduced by the recorded size, not `size`.
    pub fn record_destruction(
        &mut self,
        id: ObjectId,
        type_name: &str,
        size: usize,
    ) -> Option<TrackedObject> {
        let record = self.live.remove(&id)?;
        if record.type_name != type_name || record.size != size {
            tracing::debug!(
                %id,
                recorded = %record.type_name,
                recorded_size = record.size,
                reported = type_name,
                reported_size = size,
                "destruction metadata differs from construction"
            );
        }
        self.live_bytes = self.live_bytes.saturating_sub(record.size);
        Some(record)
    }

    /// Total bytes held by live objects
    pub fn current_bytes(&self) -> usize {
        self.live_bytes
    }

    /// Number of live objects
    pub fn current_count(&self) -> usize {
        self.live.len()
    }

    /// Highest `current_bytes` ever observed
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }

    /// Metadata for a live object
    pub fn get(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.live.get(&id)
    }

    /// Whether `id` is live
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.live.contains_key(&id)
    }

    /// Group live objects (and, with `include_all`, history) by type.
    pub fn report(&self, include_all: bool) -> MemoryReport {
        let mut by_type: HashMap<&str, Tally> = HashMap::new();
        for record in self.live.values() {
            let tally = by_type.entry(record.type_name.as_str()).or_default();
            tally.count += 1;
            tally.bytes = tally.bytes.saturating_add(record.size);
        }
        let live = report::sorted_groups(
            by_type
                .into_iter()
                .map(|(name, tally)| TypeGroup::new(name, tally.count, tally.bytes)),
        );

        let (history, ctor_args) = if include_all {
            let history = report::sorted_groups(
                self.history
                    .iter()
                    .map(|(name, tally)| TypeGroup::new(name, tally.count, tally.bytes)),
            );
            let mut ctor_args: Vec<CtorCount> = self
                .ctor_counts
                .iter()
                .map(|((type_name, args), &count)| CtorCount {
                    type_name: type_name.clone(),
                    args: args.clone(),
                    count,
                })
                .collect();
            ctor_args.sort_by(|a, b| b.count.cmp(&a.count));
            (Some(history), Some(ctor_args))
        } else {
            (None, None)
        };

        MemoryReport {
            live_count: self.current_count(),
            live_bytes: self.live_bytes,
            peak_bytes: self.peak_bytes,
            live,
            history,
            ctor_args,
        }
    }

    /// Write the grouped report to `out`
    pub fn write_report<W: io::Write>(&self, out: &mut W, include_all: bool) -> io::Result<()> {
        write!(out, "{}", self.report(include_all))
    }

    /// Forget every record and all history
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

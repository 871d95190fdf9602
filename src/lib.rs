//! # In-process diagnostics core
//!
//! Verbosity control, cumulative timers, and object lifecycle accounting
//! for a host application, built so that disabled diagnostics cost next to
//! nothing at the call site.
//!
//! ## Components
//!
//! 1. **Severity model**: ordered [`LogLevel`]s and an atomic threshold
//! 2. **Message sink**: one reused pending buffer, emitted as a labelled line
//! 3. **Category/trace gate**: opt-in category prefixes and trace depth limits
//! 4. **Timer registry**: named, pausable stopwatches with a final summary line
//! 5. **Object ledger**: live objects by identity, grouped into a memory report
//!
//! All of it hangs off one explicit [`Instrumentation`] context created at
//! start-up and consumed at shutdown.
//!
//! ## Usage Example
//!
//! ```
//! use instrumentation::{diag_info, Instrumentation, InstrumentationConfig, LogLevel, MemoryOutput};
//!
//! let output = MemoryOutput::new();
//! let instr = Instrumentation::start(
//!     InstrumentationConfig::default()
//!         .with_threshold(LogLevel::Info)
//!         .with_elapsed_prefix(false),
//!     Some(Box::new(output.clone())),
//! );
//!
//! diag_info!(instr, "loaded {} transactions", 42);
//! instr.start_timer("report", LogLevel::Info);
//! instr.finish_timer("report");
//!
//! assert_eq!(output.lines()[0], "[INFO] loaded 42 transactions");
//! assert!(instr.shutdown().is_clean());
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod severity;  // Ordered levels and the global threshold
pub mod sink;      // Pending buffer and output destinations
pub mod gate;      // Category and trace visibility predicates
pub mod timer;     // Cumulative named timers
pub mod ledger;    // Object lifecycle and memory accounting
pub mod config;    // Configuration boundary
pub mod assertion; // Fatal-failure hook boundary
pub mod context;   // Process-wide instrumentation state

// Re-exports for convenience
pub use severity::{LogLevel, Threshold};
pub use sink::{LogOutput, MemoryOutput, MessageSink, TracingOutput, WriterOutput};
pub use gate::CategoryFilter;
pub use timer::{Clock, ManualClock, SystemClock, TimerRegistry, TimerState, TimerSummary};
pub use ledger::{MemoryReport, ObjectId, ObjectLedger, TypeGroup};
pub use config::InstrumentationConfig;
pub use assertion::{AssertionFailure, FailureHook};
pub use context::{CategoryLogger, Instrumentation, ShutdownReport};

use thiserror::Error;

/// Errors surfaced by the instrumentation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstrumentationError {
    /// An object was constructed at an identity that is already live
    #[error("Duplicate construction of {type_name} at live identity {id}")]
    DuplicateIdentity {
        /// Identity already in the ledger
        id: ObjectId,
        /// Type reported by the second construction
        type_name: String,
    },

    /// Unrecognised severity level name
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Trace limit is not a non-negative integer
    #[error("Invalid trace level: {0}")]
    InvalidTraceLimit(String),
}

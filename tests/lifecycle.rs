//! Start, reconfigure, track, and shut down a context end to end

mod common;

use std::fmt;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use common::capturing;
use instrumentation::{
    diag_debug, diag_info, Instrumentation, InstrumentationConfig, LogLevel, ObjectId, WriterOutput,
};

#[test]
fn test_fully_disabled_context_has_no_side_effects() {
    let instr = Instrumentation::disabled();
    assert!(!diag_info!(instr, "hidden"));
    assert!(!instr.start_timer("t", LogLevel::Info));
    instr
        .track::<u64>(ObjectId::from_raw(1), "")
        .expect("tracking is a no-op when verification is off");
    assert_eq!(instr.current_count(), 0);

    let report = instr.shutdown();
    assert!(report.is_clean());
    assert_eq!(report.peak_bytes, 0);
}

#[test]
fn test_explicit_bookkeeping_ignores_verify_switch() {
    let instr = Instrumentation::disabled();
    instr
        .record_construction(ObjectId::from_raw(7), "Amount", 24, "")
        .unwrap();
    assert_eq!(instr.current_bytes(), 24);
    assert!(instr.record_destruction(ObjectId::from_raw(7), "Amount", 24));
    assert!(!instr.record_destruction(ObjectId::from_raw(7), "Amount", 24));
}

#[test]
fn test_reconfigure_at_runtime() {
    let (instr, output, _clock) = capturing(InstrumentationConfig::default());
    assert!(!diag_info!(instr, "before"));

    let verbose = InstrumentationConfig::from_flags(true, None, None, false).unwrap();
    instr.configure(&verbose);
    assert!(diag_info!(instr, "after"));
    assert_eq!(output.lines(), vec!["[INFO] after".to_string()]);
}

#[test]
fn test_writer_output_end_to_end() {
    let instr = Instrumentation::start(
        InstrumentationConfig::default().with_elapsed_prefix(false),
        Some(Box::new(WriterOutput::new(Vec::new()))),
    );
    assert!(instr.log(LogLevel::Error, |buf| buf.push_str("written")));
    assert!(instr.set_output(None).is_some());
    assert!(!instr.log(LogLevel::Error, |buf| buf.push_str("dropped")));
}

#[test]
fn test_emit_memory_report_through_sink() {
    let (instr, output, _clock) = capturing(InstrumentationConfig::default().with_verify(true));
    instr
        .record_construction(ObjectId::from_raw(1), "Amount", 10, "")
        .unwrap();
    assert_eq!(instr.emit_memory_report(LogLevel::Warn, false), 2);
    assert_eq!(instr.emit_memory_report(LogLevel::Info, false), 0);
    assert!(output.lines()[0].starts_with("[WARN] Live objects: 1"));
}

#[test]
fn test_concurrent_lines_do_not_interleave() {
    let (instr, output, _clock) =
        capturing(InstrumentationConfig::default().with_threshold(LogLevel::Info));
    let instr = Arc::new(instr);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let instr = Arc::clone(&instr);
            thread::spawn(move || {
                for i in 0..50 {
                    diag_info!(instr, "thread {} message {}", t, i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = output.lines();
    assert_eq!(lines.len(), 200);
    for line in lines {
        assert!(line.starts_with("[INFO] thread "), "{line}");
        assert_eq!(line.matches("message").count(), 1, "{line}");
    }
}

struct Posting<'a>(&'a Instrumentation, &'static str);

impl fmt::Display for Posting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        diag_debug!(self.0, "posting.fmt", "formatting {}", self.1);
        f.write_str(self.1)
    }
}

#[test]
fn test_message_argument_may_log_through_same_context() {
    let (instr, output, _clock) = capturing(
        InstrumentationConfig::default()
            .with_threshold(LogLevel::Debug)
            .with_category("posting"),
    );
    let instr = Arc::new(instr);

    let (done, finished) = mpsc::channel();
    let worker = Arc::clone(&instr);
    thread::spawn(move || {
        let written = diag_info!(worker, "balancing {}", Posting(&worker, "Assets:Cash"));
        let _ = done.send(written);
    });

    let written = finished
        .recv_timeout(Duration::from_secs(5))
        .expect("nested log call returned");
    assert!(written);
    assert_eq!(
        output.lines(),
        vec![
            "[DEBG] formatting Assets:Cash".to_string(),
            "[INFO] balancing Assets:Cash".to_string(),
        ]
    );
}

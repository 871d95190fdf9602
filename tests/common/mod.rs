#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use instrumentation::{
    Instrumentation, InstrumentationConfig, ManualClock, MemoryOutput, MemoryReport,
};

/// Context writing into an in-memory capture, timed by a manual clock.
pub fn capturing(config: InstrumentationConfig) -> (Instrumentation, MemoryOutput, Arc<ManualClock>) {
    let output = MemoryOutput::new();
    let clock = Arc::new(ManualClock::new());
    let instr = Instrumentation::start_with_clock(
        config.with_elapsed_prefix(false),
        Some(Box::new(output.clone())),
        clock.clone(),
    );
    (instr, output, clock)
}

fn snapshot_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
        .join(name)
}

/// Compare a rendered report against `tests/snapshots/<name>` line by line.
///
/// Set `INSTRUMENTATION_UPDATE_SNAPSHOTS` to rewrite the stored copy.
pub fn assert_report_snapshot(name: &str, report: &MemoryReport) {
    let path = snapshot_path(name);
    let actual = report.lines();
    if std::env::var_os("INSTRUMENTATION_UPDATE_SNAPSHOTS").is_some() {
        let mut rendered = actual.join("\n");
        rendered.push('\n');
        fs::write(&path, rendered).expect("write snapshot");
        return;
    }

    let stored = fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {path:?} not found"));
    let expected: Vec<&str> = stored.lines().collect();
    for (n, (want, got)) in expected.iter().zip(&actual).enumerate() {
        assert_eq!(*want, got.as_str(), "{name}: line {} differs", n + 1);
    }
    assert_eq!(
        expected.len(),
        actual.len(),
        "{name}: expected {} lines, rendered {}",
        expected.len(),
        actual.len()
    );
}

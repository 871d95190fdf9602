//! Timer accumulation through the context

mod common;

use std::time::Duration;

use common::capturing;
use instrumentation::{InstrumentationConfig, LogLevel, TimerState};

fn info() -> InstrumentationConfig {
    InstrumentationConfig::default().with_threshold(LogLevel::Info)
}

#[test]
fn test_timer_accumulates_across_pauses() {
    let (instr, output, clock) = capturing(info());

    assert!(instr.start_timer("t", LogLevel::Info));
    clock.advance(Duration::from_millis(30));
    assert!(instr.stop_timer("t"));
    assert_eq!(instr.timer_state("t"), Some(TimerState::Paused));

    // Time spent paused is not counted
    clock.advance(Duration::from_secs(5));

    assert!(instr.start_timer("t", LogLevel::Info));
    clock.advance(Duration::from_millis(12));
    assert!(instr.finish_timer("t"));

    assert_eq!(output.lines(), vec!["[INFO] t: 42.000ms".to_string()]);
    assert_eq!(instr.timer_state("t"), None);
}

#[test]
fn test_finish_twice_is_noop() {
    let (instr, output, _clock) = capturing(info());
    instr.start_timer("t", LogLevel::Info);
    assert!(instr.finish_timer("t"));
    assert!(!instr.finish_timer("t"));
    assert_eq!(output.lines().len(), 1);
}

#[test]
fn test_stop_without_start_is_noop() {
    let (instr, output, _clock) = capturing(info());
    assert!(!instr.stop_timer("never"));
    assert!(!instr.finish_timer("never"));
    assert!(output.lines().is_empty());
}

#[test]
fn test_double_start_keeps_original_run() {
    let (instr, _output, clock) = capturing(info());
    instr.start_timer("t", LogLevel::Info);
    clock.advance(Duration::from_millis(8));
    instr.start_timer("t", LogLevel::Info);
    clock.advance(Duration::from_millis(2));
    assert_eq!(instr.timer_elapsed("t"), Some(Duration::from_millis(10)));
}

#[test]
fn test_summary_uses_level_captured_at_first_start() {
    let (instr, output, _clock) = capturing(info());
    instr.start_timer("t", LogLevel::Warn);
    instr.stop_timer("t");
    instr.start_timer("t", LogLevel::Info);

    // Warn is still shown after dropping to Warn, Info would not be
    instr.set_threshold(LogLevel::Warn);
    assert!(instr.finish_timer("t"));
    assert!(output.lines()[0].starts_with("[WARN] t: "));
}

#[test]
fn test_nested_timers_are_independent() {
    let (instr, output, clock) = capturing(info());
    instr.info_start("outer", |buf| buf.push_str("Whole report"));
    clock.advance(Duration::from_millis(1));
    instr.info_start("inner", |buf| buf.push_str("Sorting:"));
    clock.advance(Duration::from_millis(2));
    instr.info_finish("inner");
    clock.advance(Duration::from_millis(3));
    instr.info_finish("outer");

    assert_eq!(
        output.lines(),
        vec![
            "[INFO] Sorting: 2.000ms".to_string(),
            "[INFO] Whole report (6.000ms)".to_string(),
        ]
    );
}

#[test]
fn test_timers_cost_nothing_when_disabled() {
    let (instr, output, _clock) = capturing(InstrumentationConfig::silent());
    assert!(!instr.start_timer("t", LogLevel::Critical));
    assert!(!instr.info_start("t", |_| panic!("description must not be built")));
    assert_eq!(instr.timer_state("t"), None);
    assert!(instr.shutdown().unfinished_timers.is_empty());
    assert!(output.lines().is_empty());
}

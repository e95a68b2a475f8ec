//! Integration tests for the logging system
//!
//! These tests verify the global logger through the public namespace,
//! including messages emitted by the animation update itself.
//!
//! Run with: cargo test --test logging_integration_tests

use galaxy_3d_animation::galaxy3d::log::{self, LogEntry, LogSeverity, Logger};
use galaxy_3d_animation::galaxy3d::scheduler::{BatchScheduler, SchedulerConfig};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    log::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    log::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].source, "test::module");
        assert_eq!(captured[0].message, "Test info message");
        assert_eq!(captured[1].severity, LogSeverity::Warn);
        assert_eq!(captured[1].file, None);
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    log::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].file, Some("test_file.rs"));
        assert_eq!(captured[0].line, Some(42));
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    log::log(LogSeverity::Info, "test", "Message 1".to_string());
    log::reset_logger();
    log::log(LogSeverity::Info, "test", "Message 2".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[test]
#[serial]
fn test_integration_worker_panic_logged_as_error() {
    let scheduler = BatchScheduler::new(SchedulerConfig {
        worker_count: 2,
        ..SchedulerConfig::default()
    })
    .unwrap();
    let (test_logger, entries) = TestLogger::new();
    log::set_logger(test_logger);

    let mut items = vec![0u32; 10];
    let report = scheduler.run_batch_mut(&mut items, 5, |i, _| {
        if i == 7 {
            panic!("broken pose");
        }
    });

    log::reset_logger();

    assert_eq!(report.faulted_chunks, 1);
    let captured = entries.lock().unwrap();
    let errors: Vec<&LogEntry> = captured
        .iter()
        .filter(|e| e.severity == LogSeverity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, "galaxy3d::BatchScheduler");
    assert!(errors[0].message.contains("5..10"));
    assert!(errors[0].message.contains("broken pose"));
    assert!(errors[0].file.is_some());
    assert!(errors[0].line.is_some());
}

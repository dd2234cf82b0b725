#![allow(clippy::unwrap_used, clippy::expect_used)]

use gcr_core::errors::{ExError, ExErrorKind};
use gcr_core::logging_facility::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use gcr_core::logging_facility::test_capture::init_test_capture;
use gcr_core::{log_op_end, log_op_error, log_op_start};

#[test]
fn test_start_and_end_events_are_captured() {
    let capture = init_test_capture();
    let op = "capture_start_end_unique_1";

    log_op_start!(op, key = "node-a");
    log_op_end!(op, duration_ms = 7u64, key = "node-a");

    capture.assert_event_exists(op, EVENT_START);
    capture.assert_event_exists(op, EVENT_END);

    let events = capture.events_for_op(op);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].fields.get("duration_ms"), Some(&"7".to_string()));
    assert_eq!(events[1].fields.get("key"), Some(&"node-a".to_string()));
}

#[test]
fn test_error_event_carries_code() {
    let capture = init_test_capture();
    let op = "capture_error_unique_2";

    let err = ExError::new(ExErrorKind::NotFound).with_op(op);
    log_op_error!(op, &err, duration_ms = 1u64);

    let events = capture.events_for_op(op);
    let error_event = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(
        error_event.fields.get("err_code"),
        Some(&"ERR_NOT_FOUND".to_string())
    );
    assert_eq!(error_event.level, tracing::Level::ERROR);
}

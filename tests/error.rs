use std::path::PathBuf;

use serde_json::Value;
use taskdeck::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    for err in [
        Error::Validation("title cannot be empty".to_string()),
        Error::NotFound("td-1".to_string()),
        Error::InvalidArgument("bad input".to_string()),
        Error::InvalidConfig("bad config".to_string()),
    ] {
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
    }
}

#[test]
fn exit_code_operation_failed() {
    let persistence = Error::Persistence("disk full".to_string());
    assert_eq!(persistence.exit_code(), exit_codes::OPERATION_FAILED);

    let lock = Error::LockFailed(PathBuf::from("/tmp/tasks.json.lock"));
    assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn kinds_are_stable() {
    assert_eq!(Error::NotFound("x".to_string()).kind(), "not_found");
    assert_eq!(Error::Validation("x".to_string()).kind(), "validation");
    assert_eq!(Error::Persistence("x".to_string()).kind(), "persistence");
    assert_eq!(Error::CorruptState("x".to_string()).kind(), "corrupt_state");
}

#[test]
fn details_include_missing_id() {
    let err = Error::NotFound("td-01h".to_string());
    let details = err.details().expect("details");
    assert_eq!(details["id"], "td-01h");
}

#[test]
fn json_error_serializes_code_and_details() {
    let err = Error::Persistence("slot write failed".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::OPERATION_FAILED);
    assert_eq!(json.kind, "persistence");
    assert!(json.message.contains("Failed to persist tasks"));

    let value: Value = serde_json::to_value(&json).expect("serialize");
    assert_eq!(value["details"]["message"], "slot write failed");
}

#[test]
fn io_errors_have_no_details() {
    let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
    assert!(err.details().is_none());
    let value: Value = serde_json::to_value(JsonError::from(&err)).expect("serialize");
    assert!(value.get("details").is_none());
}

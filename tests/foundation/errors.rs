//! Integration tests for Error types
//!
//! Tests error construction, display, and the codec error taxonomy.

use starbridge_foundation::{BodyId, Error, ErrorContext, ErrorKind, SerializationError};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_body_not_found() {
    let err = Error::body_not_found(BodyId::new(42, 1));
    assert!(matches!(err.kind, ErrorKind::BodyNotFound(_)));
    assert!(format!("{err}").contains("42"));
}

#[test]
fn error_stale_body() {
    let err = Error::stale_body(BodyId::new(5, 2));
    assert!(matches!(err.kind, ErrorKind::StaleBody(_)));
    assert!(format!("{err}").contains('5'));
}

#[test]
fn error_not_found() {
    let err = Error::not_found("Barnard's Star b");
    assert!(matches!(err.kind, ErrorKind::NotFound(_)));
    assert!(format!("{err}").contains("Barnard's Star b"));
}

// =============================================================================
// Codec Errors
// =============================================================================

#[test]
fn unsupported_handle_is_a_serialization_error() {
    let err = Error::unsupported_handle();
    assert_eq!(
        err.as_serialization(),
        Some(&SerializationError::UnsupportedHandle)
    );
}

#[test]
fn unknown_type_names_the_type() {
    let err = Error::unknown_type("Teapot");
    let msg = format!("{err}");
    assert!(msg.contains("unknown userdata type"));
    assert!(msg.contains("Teapot"));
}

#[test]
fn unrecognized_tag_quotes_the_line() {
    let err = Error::unrecognized_tag("Bogus\n");
    assert!(format!("{err}").contains("\"Bogus\\n\""));
}

#[test]
fn malformed_reports_both_sides() {
    let err = Error::malformed("integer", "abc");
    let msg = format!("{err}");
    assert!(msg.contains("integer"));
    assert!(msg.contains("abc"));
}

#[test]
fn non_codec_errors_have_no_serialization_kind() {
    assert!(Error::not_found("x").as_serialization().is_none());
}

// =============================================================================
// Error Display
// =============================================================================

#[test]
fn bad_argument_reads_like_lua() {
    let err = Error::bad_argument("UserDataSerialize", 1, "userdata", "number");
    assert_eq!(
        format!("{err}"),
        "bad argument #1 to 'UserDataSerialize' (userdata expected, got number)"
    );
}

#[test]
fn save_version_display() {
    let err = Error::new(ErrorKind::SaveVersion {
        expected: 1,
        found: 7,
    });
    let msg = format!("{err}");
    assert!(msg.contains('1'));
    assert!(msg.contains('7'));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_frames_accumulate() {
    let err = Error::unsupported_handle()
        .with_frame("missions.target")
        .with_frame("PersistentData");
    let context = err.context.unwrap();
    assert_eq!(context.stack, vec!["missions.target", "PersistentData"]);
}

#[test]
fn context_display() {
    let context = ErrorContext::new()
        .with_source("mission.lua")
        .with_line(12)
        .with_frame("OnDock");
    let text = context.to_string();
    assert!(text.starts_with("at mission.lua:12"));
    assert!(text.contains("in OnDock"));
}

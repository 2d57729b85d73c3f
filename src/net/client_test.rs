use super::*;

#[test]
fn join_url_normalizes_slashes() {
    assert_eq!(join_url("http://h/api", "/tasks"), "http://h/api/tasks");
    assert_eq!(join_url("http://h/api/", "tasks"), "http://h/api/tasks");
    assert_eq!(join_url("http://h/api/", "/file/status"), "http://h/api/file/status");
}

#[test]
fn with_base_url_trims_trailing_slash() {
    let client = ApiClient::with_base_url("http://localhost:9/api/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:9/api");
}

#[test]
fn html_bodies_are_detected() {
    assert!(looks_like_html("<!DOCTYPE html><html><body>502</body></html>"));
    assert!(looks_like_html("  \n<html>"));
    assert!(looks_like_html("<HEAD><title>Bad Gateway</title>"));
    assert!(!looks_like_html(r#"{"message":"<html>"}"#));
    assert!(!looks_like_html(""));
}

#[test]
fn html_error_classifies_as_unreachable() {
    let err = classify_error(502, "<!doctype html><h1>Bad Gateway</h1>");
    assert!(matches!(err, ApiError::BackendUnreachable { status: 502 }));
}

#[test]
fn json_error_uses_message_field() {
    let err = classify_error(400, r#"{"message":"styles file missing header"}"#);
    match err {
        ApiError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "styles file missing header");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn json_error_falls_back_to_error_field() {
    let err = classify_error(500, r#"{"error":"Internal Server Error","status":500}"#);
    assert!(matches!(err, ApiError::Server { message, .. } if message == "Internal Server Error"));
}

#[test]
fn plain_text_error_is_truncated() {
    let body = "x".repeat(2_000);
    let ApiError::Server { message, .. } = classify_error(500, &body) else {
        panic!("expected server error");
    };
    assert_eq!(message.len(), MAX_ERROR_BODY_CHARS);
}

#[test]
fn empty_error_body_has_placeholder() {
    assert!(matches!(classify_error(503, "  "), ApiError::Server { message, .. } if message == "no response body"));
}

#[test]
fn parse_json_treats_empty_body_as_null() {
    let value: Option<u32> = parse_json("").unwrap();
    assert_eq!(value, None);
    parse_json::<()>("  ").unwrap();
}

#[test]
fn parse_json_reports_parse_error() {
    let err = parse_json::<Vec<u32>>("{not json").unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[test]
fn multibyte_prefix_does_not_panic() {
    let body = "é".repeat(100);
    assert!(!looks_like_html(&body));
}

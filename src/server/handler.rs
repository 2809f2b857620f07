//! `POST /send-webhook`.
//!
//! Every response is a bare status code. Error detail only goes to the log.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode, header};

use super::AppState;
use crate::models::{Submission, SubmissionError};
use crate::relay;

/// Parse the body, relay it, and report the outcome as a status code.
pub async fn send_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejecting unreadable request body");
            return rejection.status();
        }
    };

    let submission = match parse_submission(&headers, &body) {
        Ok(submission) => submission,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting unparseable submission");
            return StatusCode::BAD_REQUEST;
        }
    };

    relay::submit(state.forwarder.as_ref(), &submission)
        .await
        .status_code()
}

/// Decode the body according to its content type. Bodies of any other
/// type are treated as an empty submission.
pub fn parse_submission(headers: &HeaderMap, body: &[u8]) -> Result<Submission, SubmissionError> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "application/json" => Submission::from_json(body),
        m if m.starts_with("application/") && m.ends_with("+json") => Submission::from_json(body),
        "application/x-www-form-urlencoded" => Submission::from_form(body),
        _ => Ok(Submission::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn json_with_charset_is_parsed() {
        let headers = content_type("application/json; charset=utf-8");
        let s = parse_submission(&headers, br#"{"a": "1"}"#).unwrap();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn form_body_is_parsed() {
        let headers = content_type("application/x-www-form-urlencoded");
        let s = parse_submission(&headers, b"a=1&b=2").unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn unknown_content_type_is_empty_submission() {
        let headers = content_type("text/plain");
        assert!(parse_submission(&headers, b"hello").unwrap().is_empty());
        assert!(parse_submission(&HeaderMap::new(), b"a=1").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let headers = content_type("application/json");
        assert!(parse_submission(&headers, b"{oops").is_err());
    }
}

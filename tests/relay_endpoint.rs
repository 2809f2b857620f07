//! Integration tests for `POST /send-webhook` using a mock forwarder.
//!
//! Drives the full router (CORS, origin guard, handler) in-process with
//! `tower::ServiceExt::oneshot`, so no sockets are opened.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use formrelay::models::Envelope;
use formrelay::relay::{ForwardError, Forwarder};
use formrelay::server::build_router;

/// How the mock destination answers.
#[derive(Clone, Copy)]
enum Reply {
    Accept,
    Reject(u16),
    Unreachable,
}

/// A forwarder that records envelopes instead of sending them.
struct MockForwarder {
    reply: Reply,
    sent: Mutex<Vec<Envelope>>,
}

impl MockForwarder {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forwarder for MockForwarder {
    async fn forward(&self, envelope: &Envelope) -> Result<(), ForwardError> {
        self.sent.lock().unwrap().push(envelope.clone());
        match self.reply {
            Reply::Accept => Ok(()),
            Reply::Reject(status) => Err(ForwardError::Rejected {
                status,
                body: r#"{"message": "Cannot send an empty message", "code": 50006}"#.to_string(),
            }),
            Reply::Unreachable => Err(ForwardError::Transport(
                "error sending request: connection refused".to_string(),
            )),
        }
    }
}

fn app(forwarder: &Arc<MockForwarder>) -> Router {
    build_router(forwarder.clone())
}

fn json_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/send-webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_post_from(origin: &str, body: &str) -> Request<Body> {
    let mut request = json_post(body);
    request
        .headers_mut()
        .insert(header::ORIGIN, origin.parse().unwrap());
    request
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn many_keys(count: usize) -> String {
    let pairs: Vec<String> = (0..count).map(|i| format!("\"k{i}\": \"v{i}\"")).collect();
    format!("{{{}}}", pairs.join(", "))
}

// ---------------------------------------------------------------------------
// relay outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn simple_submission_is_relayed_as_embed() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let response = app(&forwarder)
        .oneshot(json_post(r#"{"name": "Alice", "msg": "hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    let sent = forwarder.sent();
    assert_eq!(sent.len(), 1);
    let values: Vec<&str> = sent[0].fields().iter().map(|f| f.value.as_str()).collect();
    assert_eq!(values, vec!["Alice", "hi"]);
}

#[tokio::test]
async fn thirty_keys_are_relayed_as_fallback_text() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let response = app(&forwarder)
        .oneshot(json_post(&many_keys(30)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let sent = forwarder.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_fallback());
    assert!(sent[0].content().contains("\"k29\": \"v29\""));
}

#[tokio::test]
async fn destination_rejection_becomes_bad_gateway_without_body() {
    let forwarder = MockForwarder::new(Reply::Reject(400));
    let response = app(&forwarder)
        .oneshot(json_post(r#"{"name": "Alice"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn transport_failure_becomes_server_error_without_body() {
    let forwarder = MockForwarder::new(Reply::Unreachable);
    let response = app(&forwarder)
        .oneshot(json_post(r#"{"name": "Alice"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());
}

// ---------------------------------------------------------------------------
// request bodies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn url_encoded_form_is_relayed() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let request = Request::builder()
        .method("POST")
        .uri("/send-webhook")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("email=a%40b.test&note=&topping=ham&topping=egg"))
        .unwrap();
    let response = app(&forwarder).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let sent = forwarder.sent();
    let fields: Vec<(&str, &str)> = sent[0]
        .fields()
        .iter()
        .map(|f| (f.name.as_str(), f.value.as_str()))
        .collect();
    assert_eq!(
        fields,
        vec![("email", "a@b.test"), ("note", "\u{2014}"), ("topping", "ham,egg")]
    );
}

#[tokio::test]
async fn malformed_json_is_bad_request_and_not_relayed() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let response = app(&forwarder)
        .oneshot(json_post("{\"name\": "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_bytes(response).await.is_empty());
    assert!(forwarder.sent().is_empty());
}

#[tokio::test]
async fn oversized_body_is_refused_without_body() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let padding = "x".repeat(3 * 1024 * 1024);
    let response = app(&forwarder)
        .oneshot(json_post(&format!(r#"{{"blob": "{padding}"}}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_bytes(response).await.is_empty());
    assert!(forwarder.sent().is_empty());
}

#[tokio::test]
async fn bracketed_form_names_are_expanded() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let request = Request::builder()
        .method("POST")
        .uri("/send-webhook")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("tags%5B%5D=a&tags%5B%5D=b&user[name]=x"))
        .unwrap();
    let response = app(&forwarder).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let sent = forwarder.sent();
    let fields: Vec<(&str, &str)> = sent[0]
        .fields()
        .iter()
        .map(|f| (f.name.as_str(), f.value.as_str()))
        .collect();
    assert_eq!(fields, vec![("tags", "a,b"), ("user", r#"{"name":"x"}"#)]);
}

#[tokio::test]
async fn body_without_content_type_relays_empty_embed() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let request = Request::builder()
        .method("POST")
        .uri("/send-webhook")
        .body(Body::from("name=Alice"))
        .unwrap();
    let response = app(&forwarder).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let sent = forwarder.sent();
    assert!(!sent[0].is_fallback());
    assert!(sent[0].fields().is_empty());
}

#[tokio::test]
async fn get_is_not_allowed() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let request = Request::builder()
        .method("GET")
        .uri("/send-webhook")
        .body(Body::empty())
        .unwrap();
    let response = app(&forwarder).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(forwarder.sent().is_empty());
}

// ---------------------------------------------------------------------------
// cross-origin policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn disallowed_origin_never_reaches_forwarder() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let response = app(&forwarder)
        .oneshot(json_post_from("https://evil.example", r#"{"name": "Alice"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    assert!(body_bytes(response).await.is_empty());
    assert!(forwarder.sent().is_empty());
}

#[tokio::test]
async fn allowed_origin_gets_credentialed_cors_headers() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let response = app(&forwarder)
        .oneshot(json_post_from("http://localhost:5500", r#"{"name": "Alice"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5500"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert_eq!(forwarder.sent().len(), 1);
}

#[tokio::test]
async fn preflight_from_allowed_origin_is_answered() {
    let forwarder = MockForwarder::new(Reply::Accept);
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/send-webhook")
        .header(header::ORIGIN, "http://127.0.0.1:5500")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app(&forwarder).oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://127.0.0.1:5500"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert!(forwarder.sent().is_empty());
}

//! HTTP surface: router, cross-origin policy, and the listener loop.
//!
//! Layers, outermost first: request tracing, CORS (answers preflights and
//! sets the allow headers for listed origins), then the origin guard,
//! which turns away any request whose `Origin` is not on the allow-list
//! before it reaches the handler.

pub mod handler;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::constants::{ALLOWED_ORIGINS, RELAY_PATH};
use crate::relay::Forwarder;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<dyn Forwarder>,
}

/// Build the relay router around a forwarder.
pub fn build_router(forwarder: Arc<dyn Forwarder>) -> Router {
    Router::new()
        .route(RELAY_PATH, post(handler::send_webhook))
        .layer(middleware::from_fn(reject_foreign_origin))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { forwarder })
}

/// Credentialed CORS for the fixed front-end origins.
pub fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .map(|origin| HeaderValue::from_static(*origin))
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Whether a request `Origin` header is on the allow-list.
pub fn is_allowed_origin(origin: &HeaderValue) -> bool {
    origin
        .to_str()
        .map(|o| ALLOWED_ORIGINS.contains(&o.trim_end_matches('/')))
        .unwrap_or(false)
}

/// Requests without an `Origin` header (same-origin, curl) pass through.
async fn reject_foreign_origin(request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if !is_allowed_origin(origin) {
            return StatusCode::FORBIDDEN.into_response();
        }
    }
    next.run(request).await
}

/// Accept connections on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, forwarder: Arc<dyn Forwarder>) -> std::io::Result<()> {
    let port = listener.local_addr()?.port();
    tracing::info!("Webhook proxy running on http://localhost:{port}");

    axum::serve(listener, build_router(forwarder))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

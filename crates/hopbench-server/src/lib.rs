// SPDX-License-Identifier: MIT OR Apache-2.0
//! Router and handlers for the hopbench demo server.
//!
//! Two routes: `/hello` answers directly, `/relay` issues a nested outbound
//! GET to its own `/hello` and reports how long that hop took.
#![deny(unsafe_code)]

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Shared handler state: one reused HTTP client and the server's own base
/// URL (the relay target).
#[derive(Clone)]
pub struct AppState {
    /// Client used for the nested outbound call.
    pub client: reqwest::Client,
    /// This server's externally reachable base URL.
    pub base_url: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Build the two-route router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/relay", get(relay))
        .with_state(state)
}

/// Serve the router on an already-bound listener.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

async fn hello() -> &'static str {
    "Hello, world!"
}

async fn relay(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let url = format!("{}/hello", state.base_url);
    let started = Instant::now();
    let resp = state
        .client
        .get(&url)
        .send()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()))?;
    let status = resp.status();
    let _ = resp
        .text()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()))?;
    let nested_ms = started.elapsed().as_secs_f64() * 1_000.0;

    if !status.is_success() {
        return Err(ApiError::new(
            StatusCode::BAD_GATEWAY,
            format!("nested call answered {status}"),
        ));
    }

    debug!(target: "hopbench.server", nested_ms, "relay hop complete");
    Ok(Json(json!({ "status": "ok", "nested_ms": nested_ms })))
}

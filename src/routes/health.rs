// src/routes/health.rs
//! Liveness endpoint for the monitor.
//!
//! `/health` answers as long as the process is serving HTTP. It also reports
//! whether the last refresh cycle reached every store resource, without
//! triggering a fetch itself.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Dashboard;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store_connected: bool,
    last_updated: Option<DateTime<Utc>>,
}

/// Handle `GET /health`.
async fn health(State(dashboard): State<Dashboard>) -> Json<HealthResponse> {
    // ---
    let state = dashboard.snapshot().await;
    Json(HealthResponse {
        status: "ok",
        store_connected: state.is_connected,
        last_updated: state.last_updated,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<Dashboard> {
    Router::new().route("/health", get(health))
}

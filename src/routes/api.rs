//! JSON API over the held dashboard state.
//!
//! Read endpoints serve whatever the last refresh cycle left behind; they
//! never talk to the store. `POST /api/refresh` is the manual trigger.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::analytics::DerivedAnalytics;
use crate::dashboard::{DashboardState, RefreshOutcome};
use crate::models::{Metadata, PredictionRecord};
use crate::Dashboard;

// ---

pub fn router() -> Router<Dashboard> {
    // ---
    Router::new()
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/predictions", get(predictions_handler))
        .route("/api/analytics", get(analytics_handler))
        .route("/api/metadata", get(metadata_handler))
        .route("/api/refresh", post(refresh_handler))
}

async fn dashboard_handler(State(dashboard): State<Dashboard>) -> Json<DashboardState> {
    Json(dashboard.snapshot().await)
}

async fn predictions_handler(
    State(dashboard): State<Dashboard>,
) -> Json<BTreeMap<String, Vec<PredictionRecord>>> {
    Json(dashboard.snapshot().await.predictions_by_period())
}

async fn analytics_handler(State(dashboard): State<Dashboard>) -> Json<DerivedAnalytics> {
    Json(dashboard.snapshot().await.analytics)
}

/// Held metadata plus display forms of its fields.
#[derive(Serialize)]
struct MetadataView {
    data_sources: Vec<String>,
    source_labels: Vec<String>,
    last_updated: Option<String>,
    /// `last_updated` parsed as an instant; `null` when unrecognizable.
    last_updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<Metadata> for MetadataView {
    fn from(metadata: Metadata) -> Self {
        // ---
        MetadataView {
            source_labels: metadata.source_labels(),
            last_updated_at: metadata.last_updated_instant(),
            data_sources: metadata.data_sources,
            last_updated: metadata.last_updated,
            extra: metadata.extra,
        }
    }
}

/// `null` until metadata has been loaded once.
async fn metadata_handler(State(dashboard): State<Dashboard>) -> Json<Option<MetadataView>> {
    Json(dashboard.snapshot().await.metadata.map(MetadataView::from))
}

/// Body returned by the manual trigger.
#[derive(Serialize)]
struct RefreshResponse {
    outcome: RefreshOutcome,
    error: Option<String>,
}

async fn refresh_handler(State(dashboard): State<Dashboard>) -> Json<RefreshResponse> {
    // ---
    info!("POST /api/refresh - manual refresh requested");

    let outcome = dashboard.refresh().await;
    let error = dashboard.snapshot().await.error;

    Json(RefreshResponse { outcome, error })
}

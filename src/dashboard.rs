//! In-memory dashboard state and the fetch-normalize-compare-replace cycle.
//!
//! [`Dashboard`] owns the only copy of the held sequences. Each refresh reads
//! the three store resources concurrently, normalizes what arrived, and then
//! replaces held state under a single write lock. A resource that failed to
//! load keeps its previous value; the others still update.
//!
//! Refreshes are not serialized against each other. A manual refresh that
//! overlaps a timed one simply finishes second and wins.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::analytics::{compute_analytics, DerivedAnalytics};
use crate::change::has_data_changed;
use crate::error::FetchError;
use crate::models::{Metadata, PredictionRecord, SensorReading};
use crate::normalize::{
    group_by_period, normalize_metadata, normalize_predictions, normalize_sensor_data,
};
use crate::store::{Resource, StoreClient};

// ---

/// Message shown to users when any resource failed in the last cycle.
pub const FETCH_ERROR_MESSAGE: &str =
    "Failed to load data from the air quality store. Please check your connection.";

/// Everything a presentation layer needs to render the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    // ---
    pub sensor_data: Vec<SensorReading>,
    pub predictions: Vec<PredictionRecord>,
    pub metadata: Option<Metadata>,
    pub analytics: DerivedAnalytics,

    /// True when every resource loaded in the last cycle.
    pub is_connected: bool,

    /// When a cycle last reached the store for at least one resource.
    pub last_updated: Option<DateTime<Utc>>,

    /// User-facing error from the last cycle, if any resource failed.
    pub error: Option<String>,

    #[serde(skip)]
    sensor_loaded: bool,

    #[serde(skip)]
    predictions_loaded: bool,
}

/// Normalized results of one cycle's three fetches.
#[derive(Debug)]
pub struct FetchResults {
    pub sensor_data: Result<Vec<SensorReading>, FetchError>,
    pub predictions: Result<Vec<PredictionRecord>, FetchError>,
    pub metadata: Result<Option<Metadata>, FetchError>,
}

/// What one refresh cycle did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshOutcome {
    /// Resources whose held value was replaced.
    pub replaced: Vec<Resource>,
    /// Resources that could not be fetched; their held value is unchanged.
    pub failed: Vec<Resource>,
    pub is_connected: bool,
}

impl DashboardState {
    /// Fold one cycle's results into the held state.
    pub fn apply(&mut self, results: FetchResults, now: DateTime<Utc>) -> RefreshOutcome {
        // ---
        let mut outcome = RefreshOutcome::default();

        match results.sensor_data {
            Ok(fresh) => {
                let previous = self.sensor_loaded.then_some(self.sensor_data.as_slice());
                if has_data_changed(&fresh, previous) {
                    debug!("Sensor data changed, replacing {} readings", fresh.len());
                    self.sensor_data = fresh;
                    outcome.replaced.push(Resource::SensorData);
                }
                self.sensor_loaded = true;
            }
            Err(e) => record_failure(&mut outcome, e),
        }

        match results.predictions {
            Ok(fresh) => {
                let previous = self.predictions_loaded.then_some(self.predictions.as_slice());
                if has_data_changed(&fresh, previous) {
                    debug!("Predictions changed, replacing {} records", fresh.len());
                    self.predictions = fresh;
                    outcome.replaced.push(Resource::Predictions);
                }
                self.predictions_loaded = true;
            }
            Err(e) => record_failure(&mut outcome, e),
        }

        match results.metadata {
            Ok(fresh) => {
                if fresh != self.metadata {
                    debug!("Metadata changed");
                    self.metadata = fresh;
                    outcome.replaced.push(Resource::Metadata);
                }
            }
            Err(e) => record_failure(&mut outcome, e),
        }

        let sequences_replaced = outcome
            .replaced
            .iter()
            .any(|r| matches!(r, Resource::SensorData | Resource::Predictions));
        if sequences_replaced {
            self.analytics = compute_analytics(&self.sensor_data, &self.predictions);
        }

        outcome.is_connected = outcome.failed.is_empty();
        self.is_connected = outcome.is_connected;
        self.error = (!outcome.is_connected).then(|| FETCH_ERROR_MESSAGE.to_string());
        if outcome.failed.len() < 3 {
            self.last_updated = Some(now);
        }

        outcome
    }

    /// Forecasts grouped by horizon label.
    pub fn predictions_by_period(&self) -> BTreeMap<String, Vec<PredictionRecord>> {
        group_by_period(&self.predictions)
    }
}

fn record_failure(outcome: &mut RefreshOutcome, e: FetchError) {
    // ---
    error!("Failed to fetch {}: {}", e.resource(), e);
    outcome.failed.push(e.resource());
}

/// Shared handle to the store client and held state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: StoreClient,
    state: Arc<RwLock<DashboardState>>,
}

impl Dashboard {
    pub fn new(store: StoreClient) -> Self {
        // ---
        Self {
            store,
            state: Arc::new(RwLock::new(DashboardState::default())),
        }
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Run one full cycle now.
    pub async fn refresh(&self) -> RefreshOutcome {
        // ---
        let (sensor_data, predictions, metadata) = tokio::join!(
            self.store.fetch_sensor_data(),
            self.store.fetch_predictions(),
            self.store.fetch_metadata(),
        );

        let results = FetchResults {
            sensor_data: sensor_data.map(|raw| normalize_sensor_data(&raw)),
            predictions: predictions.map(|raw| normalize_predictions(&raw)),
            metadata: metadata.map(|raw| normalize_metadata(&raw)),
        };

        let outcome = self.state.write().await.apply(results, Utc::now());

        info!(
            "Refresh complete: replaced={:?} failed={:?}",
            outcome.replaced, outcome.failed
        );
        outcome
    }
}

/// Refresh immediately, then once per `every`, forever.
pub async fn run_poller(dashboard: Dashboard, every: Duration) {
    // ---
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Polling the store every {:?}", every);
    loop {
        ticker.tick().await;
        dashboard.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    }

    fn server_error(resource: Resource) -> FetchError {
        FetchError::Status {
            resource,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn good_results() -> FetchResults {
        // ---
        FetchResults {
            sensor_data: Ok(normalize_sensor_data(&json!({
                "2024-01-01T01:00:00Z": {"PM2_5": 10},
                "2024-01-01T00:00:00Z": {"PM2_5": 8}
            }))),
            predictions: Ok(normalize_predictions(&json!({
                "6hours": {"2024-01-01T06:00:00Z": {"PM2_5": 5}}
            }))),
            metadata: Ok(normalize_metadata(&json!({"data_sources": ["pm_sensor"]}))),
        }
    }

    #[test]
    fn test_first_cycle_replaces_everything() {
        // ---
        let mut state = DashboardState::default();

        let outcome = state.apply(good_results(), now());

        assert_eq!(
            outcome.replaced,
            vec![Resource::SensorData, Resource::Predictions, Resource::Metadata]
        );
        assert!(outcome.is_connected);
        assert!(state.is_connected);
        assert_eq!(state.error, None);
        assert_eq!(state.last_updated, Some(now()));
        assert_eq!(state.analytics.total_records, 2);
        assert_eq!(state.analytics.next_6h_aqi, Some(21));
    }

    #[test]
    fn test_unchanged_data_is_not_replaced() {
        // ---
        let mut state = DashboardState::default();
        state.apply(good_results(), now());

        let outcome = state.apply(good_results(), now());

        assert!(outcome.replaced.is_empty());
        assert!(outcome.is_connected);
    }

    #[test]
    fn test_metadata_failure_does_not_block_sequences() {
        // ---
        let mut state = DashboardState::default();
        let results = FetchResults {
            metadata: Err(server_error(Resource::Metadata)),
            ..good_results()
        };

        let outcome = state.apply(results, now());

        assert_eq!(outcome.replaced, vec![Resource::SensorData, Resource::Predictions]);
        assert_eq!(outcome.failed, vec![Resource::Metadata]);
        assert_eq!(state.sensor_data.len(), 2);
        assert_eq!(state.predictions.len(), 1);
        assert!(!state.is_connected);
        assert_eq!(state.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
    }

    #[test]
    fn test_failed_resource_keeps_prior_value() {
        // ---
        let mut state = DashboardState::default();
        state.apply(good_results(), now());
        let held_readings = state.sensor_data.clone();
        let held_metadata = state.metadata.clone();

        let results = FetchResults {
            sensor_data: Err(server_error(Resource::SensorData)),
            predictions: Ok(Vec::new()),
            metadata: Err(server_error(Resource::Metadata)),
        };
        let outcome = state.apply(results, now());

        assert_eq!(state.sensor_data, held_readings);
        assert_eq!(state.metadata, held_metadata);
        // Predictions did load, and an empty set differs in length.
        assert_eq!(outcome.replaced, vec![Resource::Predictions]);
        assert!(state.predictions.is_empty());
        assert_eq!(state.analytics.next_6h_aqi, None);
        assert_eq!(state.analytics.total_records, 2);
    }

    #[test]
    fn test_recovery_clears_error() {
        // ---
        let mut state = DashboardState::default();
        let failing = FetchResults {
            sensor_data: Err(server_error(Resource::SensorData)),
            predictions: Err(server_error(Resource::Predictions)),
            metadata: Err(server_error(Resource::Metadata)),
        };

        state.apply(failing, now());
        assert!(!state.is_connected);
        assert_eq!(state.last_updated, None);

        state.apply(good_results(), now());
        assert!(state.is_connected);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_predictions_by_period() {
        // ---
        let mut state = DashboardState::default();
        state.apply(good_results(), now());

        let groups = state.predictions_by_period();

        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["6hours"]);
    }
}

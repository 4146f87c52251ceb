//! Air quality monitor: polls a hosted document store for sensor readings and
//! forecasts, normalizes them into typed records, derives AQI analytics and
//! serves the result as JSON.
//!
//! Data flows leaf to root:
//! - `store` fetches raw JSON, one resource at a time
//! - `normalize` flattens it into newest-first sequences, using `aqi` and
//!   `confidence` for the derived fields
//! - `change` decides whether a fresh sequence replaces the held one
//! - `dashboard` holds the state and runs the refresh cycle
//! - `analytics` summarizes the held sequences
//! - `routes` exposes the state over HTTP

pub mod analytics;
pub mod aqi;
pub mod change;
pub mod config;
pub mod confidence;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod normalize;
pub mod routes;
pub mod store;

pub use config::Config;
pub use dashboard::{run_poller, Dashboard, DashboardState, RefreshOutcome};
pub use error::FetchError;
pub use models::{Metadata, PredictionRecord, SensorReading};
pub use store::{Resource, StoreClient};

//! HTTP client for the hosted document store.
//!
//! Three independent reads, one GET each, returning the raw JSON body. A
//! failure only affects the resource that was being read. There is no retry
//! and no timeout here: the next refresh cycle is the retry.

use std::fmt;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::Config;

// ---

/// The three resources the store serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    SensorData,
    Predictions,
    Metadata,
}

impl Resource {
    /// Path segment of the resource under the store root.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::SensorData => "sensorData",
            Resource::Predictions => "predictions",
            Resource::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::SensorData => "sensor data",
            Resource::Predictions => "predictions",
            Resource::Metadata => "metadata",
        })
    }
}

/// Read-only client for one store root.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    root: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, root: impl Into<String>) -> Self {
        // ---
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            root: root.into().trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.store_url.clone(), config.store_root.clone())
    }

    /// Full URL of a resource, e.g. `{base}/air_quality/sensorData.json`.
    pub fn url_for(&self, resource: Resource) -> String {
        // ---
        if self.root.is_empty() {
            format!("{}/{}.json", self.base_url, resource.path())
        } else {
            format!("{}/{}/{}.json", self.base_url, self.root, resource.path())
        }
    }

    pub async fn fetch_sensor_data(&self) -> Result<Value, FetchError> {
        self.fetch(Resource::SensorData).await
    }

    pub async fn fetch_predictions(&self) -> Result<Value, FetchError> {
        self.fetch(Resource::Predictions).await
    }

    pub async fn fetch_metadata(&self) -> Result<Value, FetchError> {
        self.fetch(Resource::Metadata).await
    }

    /// GET one resource and parse its body as JSON.
    pub async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        // ---
        let url = self.url_for(resource);
        tracing::debug!("Fetching {} from: {}", resource, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request { resource, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { resource, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Request { resource, source })?;

        let value: Value = serde_json::from_slice(&body)
            .map_err(|source| FetchError::Body { resource, source })?;

        tracing::debug!("Fetched {} ({} bytes)", resource, body.len());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_resource_urls() {
        // ---
        let client = StoreClient::new("https://store.example/", "air_quality");

        assert_eq!(
            client.url_for(Resource::SensorData),
            "https://store.example/air_quality/sensorData.json"
        );
        assert_eq!(
            client.url_for(Resource::Predictions),
            "https://store.example/air_quality/predictions.json"
        );
        assert_eq!(
            client.url_for(Resource::Metadata),
            "https://store.example/air_quality/metadata.json"
        );
    }

    #[test]
    fn test_empty_root() {
        // ---
        let client = StoreClient::new("http://localhost:9000", "");
        assert_eq!(
            client.url_for(Resource::Metadata),
            "http://localhost:9000/metadata.json"
        );
    }
}

//! Fetch failure taxonomy for the remote store client.
//!
//! Every variant is a network-level failure for exactly one resource. Data
//! that arrives but has an unexpected shape is not an error here: the
//! normalizer degrades it to empty output instead.

use reqwest::StatusCode;
use thiserror::Error;

use crate::store::Resource;

// ---

#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection broke mid-response.
    #[error("request for {resource} failed: {source}")]
    Request {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },

    /// The store answered with a non-success status.
    #[error("{resource} returned HTTP {status}")]
    Status {
        resource: Resource,
        status: StatusCode,
    },

    /// The response body was not JSON.
    #[error("{resource} body is not valid JSON: {source}")]
    Body {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// The resource whose fetch failed.
    pub fn resource(&self) -> Resource {
        // ---
        match self {
            FetchError::Request { resource, .. }
            | FetchError::Status { resource, .. }
            | FetchError::Body { resource, .. } => *resource,
        }
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Earthquake catalog source trait and fetchers.
//!
//! A catalog implements [`EventSource`] to return every event whose origin
//! time falls inside one [`EventWindow`]. Records that cannot be turned
//! into a valid [`EarthquakeEvent`] are skipped and reported as
//! [`MalformedRecord`] warnings; only transport or envelope failures are
//! fatal.

pub mod parsing;
pub mod usgs;

use async_trait::async_trait;
use daily_quakes_quake_models::{EarthquakeEvent, EventWindow};

pub use usgs::UsgsSource;

/// Errors that abort a fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("catalog returned HTTP {status} for {url}")]
    Status {
        /// Response status code.
        status: reqwest::StatusCode,
        /// Requested URL.
        url: String,
    },

    /// The response body is not JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response is JSON but not a `GeoJSON` `FeatureCollection`.
    #[error("invalid catalog response: {message}")]
    InvalidResponse {
        /// Description of what went wrong.
        message: String,
    },
}

/// A catalog record that was skipped because it could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// Position of the record in the response.
    pub index: usize,
    /// Catalog identifier, if the record had a readable one.
    pub id: Option<String>,
    /// Why the record was rejected.
    pub reason: String,
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "record #{} ({id}): {}", self.index, self.reason),
            None => write!(f, "record #{}: {}", self.index, self.reason),
        }
    }
}

/// Result of fetching one window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedEvents {
    /// Valid events, in the order the catalog returned them.
    pub events: Vec<EarthquakeEvent>,
    /// Records that were skipped with a warning.
    pub malformed: Vec<MalformedRecord>,
    /// Non-earthquake events (quarry blasts, explosions) left out.
    pub non_earthquake: usize,
}

/// Trait implemented by every earthquake catalog.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Returns a short human-readable name (e.g., `"USGS"`).
    fn name(&self) -> &str;

    /// Fetches all events with an origin time inside `window`.
    ///
    /// A window that has not started yet yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the catalog cannot be reached or its
    /// response cannot be decoded as a whole.
    async fn fetch(&self, window: &EventWindow) -> Result<FetchedEvents, FetchError>;
}

//! USGS FDSN event web service fetcher.
//!
//! Issues a single `format=geojson` query covering the whole day and the
//! full geographic extent. The service caps one query at 20,000 events,
//! far above a typical day (a few hundred), so no pagination is done.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use daily_quakes_quake_models::EventWindow;

use crate::{EventSource, FetchError, FetchedEvents, parsing};

/// Default FDSN event query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Timestamp format accepted by the FDSN `starttime`/`endtime` parameters.
const FDSN_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// The USGS earthquake catalog.
pub struct UsgsSource {
    client: reqwest::Client,
    endpoint: String,
    min_magnitude: Option<f64>,
}

impl UsgsSource {
    /// Creates a source querying `endpoint`, failing requests that take
    /// longer than `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("daily_quakes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            min_magnitude: None,
        })
    }

    /// Only request events at or above `magnitude`.
    #[must_use]
    pub fn with_min_magnitude(mut self, magnitude: Option<f64>) -> Self {
        self.min_magnitude = magnitude;
        self
    }

    /// Query parameters for one window.
    #[must_use]
    pub fn query_params(&self, window: &EventWindow) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "geojson".to_string()),
            (
                "starttime",
                window.start().format(FDSN_TIME_FORMAT).to_string(),
            ),
            ("endtime", window.end().format(FDSN_TIME_FORMAT).to_string()),
            ("orderby", "time-asc".to_string()),
        ];
        if let Some(magnitude) = self.min_magnitude {
            params.push(("minmagnitude", magnitude.to_string()));
        }
        params
    }
}

#[async_trait]
impl EventSource for UsgsSource {
    fn name(&self) -> &str {
        "USGS"
    }

    async fn fetch(&self, window: &EventWindow) -> Result<FetchedEvents, FetchError> {
        if window.is_future(Utc::now()) {
            log::info!("Window {window} has not started yet, nothing to fetch");
            return Ok(FetchedEvents::default());
        }

        let params = self.query_params(window);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let url = response.url().to_string();
        log::info!("Fetched earthquake data from {url}");

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, url });
        }

        let body = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        let fetched = parsing::parse_feature_collection(&json)?;

        log::info!(
            "USGS returned {} earthquakes for {window} ({} malformed, {} non-earthquake skipped)",
            fetched.events.len(),
            fetched.malformed.len(),
            fetched.non_earthquake
        );

        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn window() -> EventWindow {
        EventWindow::new(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap())
    }

    #[test]
    fn builds_full_day_query() {
        let source = UsgsSource::new(DEFAULT_ENDPOINT, Duration::from_secs(5)).unwrap();
        let params = source.query_params(&window());
        assert_eq!(
            params,
            vec![
                ("format", "geojson".to_string()),
                ("starttime", "2024-01-09T00:00:00.000".to_string()),
                ("endtime", "2024-01-09T23:59:59.999".to_string()),
                ("orderby", "time-asc".to_string()),
            ]
        );
    }

    #[test]
    fn adds_min_magnitude_when_configured() {
        let source = UsgsSource::new(DEFAULT_ENDPOINT, Duration::from_secs(5))
            .unwrap()
            .with_min_magnitude(Some(2.5));
        let params = source.query_params(&window());
        assert!(params.contains(&("minmagnitude", "2.5".to_string())));
    }

    #[tokio::test]
    async fn future_window_is_empty_without_request() {
        // Unroutable endpoint: any request would fail.
        let source = UsgsSource::new("http://127.0.0.1:9/query", Duration::from_millis(100)).unwrap();
        let future = EventWindow::new(NaiveDate::from_ymd_opt(2999, 1, 1).unwrap());
        let fetched = source.fetch(&future).await.unwrap();
        assert!(fetched.events.is_empty());
    }

    #[tokio::test]
    async fn unreachable_catalog_is_a_fetch_error() {
        let source = UsgsSource::new("http://127.0.0.1:9/query", Duration::from_millis(500)).unwrap();
        let result = source.fetch(&window()).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Daily earthquake statistics.
//!
//! [`summarize`] folds one day of [`EarthquakeEvent`]s into a
//! [`DailySummary`]. It is a pure function: the same input always yields
//! the same summary and an empty day yields a zero-filled one.

use chrono::NaiveDate;
use daily_quakes_quake_models::{DailySummary, EarthquakeEvent, MagnitudeBucket};

/// Computes counts, bucket distribution, and the strongest event for
/// `events`.
///
/// Every event counts toward `total`; only events with a magnitude are
/// assigned to a bucket. Ties for the strongest event keep the first one
/// in input order.
#[must_use]
pub fn summarize(date: NaiveDate, events: &[EarthquakeEvent]) -> DailySummary {
    let mut summary = DailySummary::empty(date);
    summary.total = events.len();

    let mut strongest: Option<&EarthquakeEvent> = None;

    for event in events {
        let Some(magnitude) = event.magnitude else {
            summary.unrated += 1;
            continue;
        };

        *summary
            .buckets
            .entry(MagnitudeBucket::for_magnitude(magnitude))
            .or_insert(0) += 1;

        if strongest
            .and_then(|s| s.magnitude)
            .is_none_or(|max| magnitude > max)
        {
            strongest = Some(event);
        }
    }

    summary.max_magnitude = strongest.and_then(|e| e.magnitude);
    summary.strongest_place = strongest.and_then(|e| e.place.clone());
    summary
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake event types shared across the daily quakes pipeline.
//!
//! The fetcher produces [`EarthquakeEvent`] records for one
//! [`EventWindow`], the aggregator folds them into a [`DailySummary`], and
//! the renderer and caption builder read that summary back. Magnitudes are
//! histogrammed into the fixed [`MagnitudeBucket`] set.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// One reported seismic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeEvent {
    /// Catalog identifier (e.g., `"us7000abcd"`).
    pub id: String,
    /// Origin time.
    pub time: DateTime<Utc>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Magnitude. `None` when the catalog has not rated the event yet.
    pub magnitude: Option<f64>,
    /// Magnitude scale reported by the catalog (e.g., `"ml"`, `"mww"`).
    pub magnitude_type: Option<String>,
    /// Hypocenter depth in kilometers.
    pub depth_km: Option<f64>,
    /// Free-text location (e.g., "10 km SSW of Ridgecrest, CA").
    pub place: Option<String>,
}

impl EarthquakeEvent {
    /// Checks the coordinate and magnitude invariants.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEventError`] if the latitude is outside
    /// `[-90, 90]`, the longitude is outside `[-180, 180]`, or the
    /// magnitude is present but negative or not finite.
    pub fn validate(&self) -> Result<(), InvalidEventError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(InvalidEventError::Latitude(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(InvalidEventError::Longitude(self.longitude));
        }
        match self.magnitude {
            Some(magnitude) if !magnitude.is_finite() || magnitude < 0.0 => {
                Err(InvalidEventError::Magnitude(magnitude))
            }
            _ => Ok(()),
        }
    }
}

/// Reason an [`EarthquakeEvent`] failed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidEventError {
    /// Latitude outside `[-90, 90]`.
    Latitude(f64),
    /// Longitude outside `[-180, 180]`.
    Longitude(f64),
    /// Negative or non-finite magnitude.
    Magnitude(f64),
}

impl std::fmt::Display for InvalidEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude(v) => write!(f, "latitude {v} out of range [-90, 90]"),
            Self::Longitude(v) => write!(f, "longitude {v} out of range [-180, 180]"),
            Self::Magnitude(v) => write!(f, "magnitude {v} is not a non-negative number"),
        }
    }
}

impl std::error::Error for InvalidEventError {}

/// A single UTC calendar day of origin times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventWindow {
    /// The calendar day covered.
    pub date: NaiveDate,
}

impl EventWindow {
    /// Creates a window covering `date`.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// The day before `now`, which is what the scheduled run reports on.
    #[must_use]
    pub fn previous_day(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self::new(today.checked_sub_days(Days::new(1)).unwrap_or(today))
    }

    /// First instant of the window (`00:00:00.000`).
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last instant of the window (`23:59:59.999`).
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.start() + TimeDelta::days(1) - TimeDelta::milliseconds(1)
    }

    /// Whether the window has not started yet at `now`.
    #[must_use]
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        self.start() > now
    }

    /// Whether `time` falls inside the window.
    #[must_use]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start() && time <= self.end()
    }
}

impl std::fmt::Display for EventWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))
    }
}

/// Fixed half-open magnitude ranges used to histogram a day of events.
///
/// An event belongs to the bucket whose range satisfies
/// `lower <= magnitude < upper`; [`MagnitudeBucket::FivePlus`] has no upper
/// bound.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
pub enum MagnitudeBucket {
    /// `[0, 2)`
    #[serde(rename = "<2")]
    #[strum(serialize = "<2")]
    BelowTwo,
    /// `[2, 3)`
    #[serde(rename = "2-3")]
    #[strum(serialize = "2-3")]
    TwoToThree,
    /// `[3, 4)`
    #[serde(rename = "3-4")]
    #[strum(serialize = "3-4")]
    ThreeToFour,
    /// `[4, 5)`
    #[serde(rename = "4-5")]
    #[strum(serialize = "4-5")]
    FourToFive,
    /// `[5, ∞)`
    #[serde(rename = "5+")]
    #[strum(serialize = "5+")]
    FivePlus,
}

impl MagnitudeBucket {
    /// All buckets in ascending magnitude order.
    pub const ALL: &[Self] = &[
        Self::BelowTwo,
        Self::TwoToThree,
        Self::ThreeToFour,
        Self::FourToFive,
        Self::FivePlus,
    ];

    /// Inclusive lower bound.
    #[must_use]
    pub const fn lower_bound(self) -> f64 {
        match self {
            Self::BelowTwo => 0.0,
            Self::TwoToThree => 2.0,
            Self::ThreeToFour => 3.0,
            Self::FourToFive => 4.0,
            Self::FivePlus => 5.0,
        }
    }

    /// Exclusive upper bound, `None` for the open-ended last bucket.
    #[must_use]
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            Self::BelowTwo => Some(2.0),
            Self::TwoToThree => Some(3.0),
            Self::ThreeToFour => Some(4.0),
            Self::FourToFive => Some(5.0),
            Self::FivePlus => None,
        }
    }

    /// Short label used in summaries and the caption (e.g., `"4-5"`).
    #[must_use]
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Returns the bucket for a validated (finite, non-negative) magnitude.
    #[must_use]
    pub fn for_magnitude(magnitude: f64) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|bucket| bucket.upper_bound().is_some_and(|upper| magnitude < upper))
            .unwrap_or(Self::FivePlus)
    }
}

/// Aggregate statistics for one day of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// The day the events occurred on.
    pub date: NaiveDate,
    /// Number of events, rated or not.
    pub total: usize,
    /// Event count per bucket. Always holds every [`MagnitudeBucket`].
    pub buckets: BTreeMap<MagnitudeBucket, usize>,
    /// Events without a magnitude (counted in `total`, not in `buckets`).
    pub unrated: usize,
    /// Largest magnitude observed, `None` when no event is rated.
    pub max_magnitude: Option<f64>,
    /// Place of the first event reaching `max_magnitude`.
    pub strongest_place: Option<String>,
}

impl DailySummary {
    /// A zero-filled summary for a day with no events.
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            buckets: MagnitudeBucket::ALL.iter().map(|&b| (b, 0)).collect(),
            unrated: 0,
            max_magnitude: None,
            strongest_place: None,
        }
    }

    /// Count for one bucket.
    #[must_use]
    pub fn count(&self, bucket: MagnitudeBucket) -> usize {
        self.buckets.get(&bucket).copied().unwrap_or(0)
    }

    /// Percentage of all events falling in `bucket`, `0.0` on an empty day.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, bucket: MagnitudeBucket) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(bucket) as f64 * 100.0 / self.total as f64
    }

    /// Whether no events were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }
}

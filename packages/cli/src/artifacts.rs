//! Daily artifacts: the map image and the event table.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, SecondsFormat};
use daily_quakes_quake_models::EarthquakeEvent;
use serde::Serialize;

use crate::config::PathsConfig;

/// Errors that can occur while saving artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// A file or directory could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The event table could not be written.
    #[error("failed to write event table: {0}")]
    Csv(#[from] csv::Error),
}

/// Files written for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    /// Map image.
    pub image: PathBuf,
    /// Event table.
    pub data: PathBuf,
}

#[derive(Serialize)]
struct EventRow<'a> {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Magnitude")]
    magnitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Depth")]
    depth: Option<f64>,
    #[serde(rename = "Place")]
    place: Option<&'a str>,
    #[serde(rename = "Id")]
    id: &'a str,
}

impl<'a> From<&'a EarthquakeEvent> for EventRow<'a> {
    fn from(event: &'a EarthquakeEvent) -> Self {
        Self {
            time: event.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            magnitude: event.magnitude,
            longitude: event.longitude,
            latitude: event.latitude,
            depth: event.depth_km,
            place: event.place.as_deref(),
            id: &event.id,
        }
    }
}

fn create_parent(path: &Path) -> Result<(), ArtifactError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Writes the event table as CSV, one row per event in input order.
///
/// # Errors
///
/// Returns [`ArtifactError`] if the file cannot be created or written.
pub fn write_events_csv(path: &Path, events: &[EarthquakeEvent]) -> Result<(), ArtifactError> {
    create_parent(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    if events.is_empty() {
        writer.write_record([
            "Time",
            "Magnitude",
            "Longitude",
            "Latitude",
            "Depth",
            "Place",
            "Id",
        ])?;
    }
    for event in events {
        writer.serialize(EventRow::from(event))?;
    }
    writer.flush().map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Saves the map image and event table for `date` under `paths`.
///
/// # Errors
///
/// Returns [`ArtifactError`] on the first file that cannot be written.
pub fn save(
    paths: &PathsConfig,
    date: NaiveDate,
    events: &[EarthquakeEvent],
    png: &[u8],
) -> Result<SavedArtifacts, ArtifactError> {
    let image = paths.image_path(date);
    create_parent(&image)?;
    std::fs::write(&image, png).map_err(|source| ArtifactError::Io {
        path: image.clone(),
        source,
    })?;

    let data = paths.data_path(date);
    write_events_csv(&data, events)?;

    log::info!("Saved {} and {}", image.display(), data.display());
    Ok(SavedArtifacts { image, data })
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn event(id: &str, magnitude: Option<f64>, place: Option<&str>) -> EarthquakeEvent {
        EarthquakeEvent {
            id: id.to_string(),
            time: DateTime::from_timestamp(1_704_800_000, 0).unwrap(),
            latitude: 35.5,
            longitude: -117.25,
            magnitude,
            magnitude_type: Some("ml".to_string()),
            depth_km: Some(7.5),
            place: place.map(str::to_string),
        }
    }

    fn paths(root: &Path) -> PathsConfig {
        PathsConfig {
            outputs_dir: root.join("outputs"),
            data_dir: root.join("data"),
            run_log: root.join("log").join("runs.log"),
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        write_events_csv(
            &path,
            &[
                event("ci1", Some(2.1), Some("10km NE of Ridgecrest, CA")),
                event("us2", None, None),
            ],
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Time,Magnitude,Longitude,Latitude,Depth,Place,Id");
        assert_eq!(
            lines[1],
            "2024-01-09T11:33:20.000Z,2.1,-117.25,35.5,7.5,\"10km NE of Ridgecrest, CA\",ci1"
        );
        assert_eq!(lines[2], "2024-01-09T11:33:20.000Z,,-117.25,35.5,7.5,,us2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_day_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        write_events_csv(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "Time,Magnitude,Longitude,Latitude,Depth,Place,Id");
    }

    #[test]
    fn save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let saved = save(&paths(dir.path()), date, &[event("a", Some(1.0), None)], b"png").unwrap();

        assert_eq!(saved.image, dir.path().join("outputs").join("2024-01-09.png"));
        assert_eq!(std::fs::read(&saved.image).unwrap(), b"png");
        assert!(saved.data.exists());
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("outputs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let result = save(&paths(dir.path()), date, &[], b"png");
        assert!(matches!(result, Err(ArtifactError::Io { .. })));
    }
}

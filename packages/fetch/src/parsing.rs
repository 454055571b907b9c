//! Conversion of USGS `GeoJSON` features into [`EarthquakeEvent`]s.
//!
//! The catalog format is documented at
//! <https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php>. Each
//! feature carries `id`, `properties.{time,mag,magType,place,type}` and
//! `geometry.coordinates = [lon, lat, depth]`.

use chrono::{DateTime, Utc};
use daily_quakes_quake_models::EarthquakeEvent;

use crate::{FetchError, FetchedEvents, MalformedRecord};

/// Event type the catalog uses for natural earthquakes.
const EARTHQUAKE_TYPE: &str = "earthquake";

/// Parses a whole `FeatureCollection` body.
///
/// Features that fail to parse are collected in
/// [`FetchedEvents::malformed`] and logged; they never fail the batch.
///
/// # Errors
///
/// Returns [`FetchError::InvalidResponse`] if `body` has no `features`
/// array.
pub fn parse_feature_collection(body: &serde_json::Value) -> Result<FetchedEvents, FetchError> {
    let features = body["features"]
        .as_array()
        .ok_or_else(|| FetchError::InvalidResponse {
            message: "No features array in GeoJSON response".to_string(),
        })?;

    let mut fetched = FetchedEvents::default();

    for (index, feature) in features.iter().enumerate() {
        match parse_feature(feature) {
            Ok(Some(event)) => fetched.events.push(event),
            Ok(None) => fetched.non_earthquake += 1,
            Err(reason) => {
                let record = MalformedRecord {
                    index,
                    id: feature["id"].as_str().map(String::from),
                    reason,
                };
                log::warn!("Skipping malformed {record}");
                fetched.malformed.push(record);
            }
        }
    }

    Ok(fetched)
}

/// Parses one feature.
///
/// Returns `Ok(None)` for well-formed records that are not earthquakes, and
/// `Err(reason)` for records that are malformed or violate the event
/// invariants.
pub fn parse_feature(feature: &serde_json::Value) -> Result<Option<EarthquakeEvent>, String> {
    let properties = feature
        .get("properties")
        .filter(|p| p.is_object())
        .ok_or("missing properties object")?;

    // Older catalog entries omit `type`; treat them as earthquakes.
    match properties["type"].as_str() {
        Some(kind) if kind != EARTHQUAKE_TYPE => {
            log::debug!("Ignoring {kind} event {}", feature["id"]);
            return Ok(None);
        }
        _ => {}
    }

    let id = feature["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .ok_or("missing id")?
        .to_string();

    let time = properties["time"]
        .as_i64()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or("missing or invalid origin time")?;

    let magnitude = match &properties["mag"] {
        serde_json::Value::Null => None,
        value => Some(value.as_f64().ok_or("magnitude is not a number")?),
    };

    let coordinates = feature["geometry"]["coordinates"]
        .as_array()
        .ok_or("missing geometry coordinates")?;
    let longitude = coordinates
        .first()
        .and_then(serde_json::Value::as_f64)
        .ok_or("missing longitude")?;
    let latitude = coordinates
        .get(1)
        .and_then(serde_json::Value::as_f64)
        .ok_or("missing latitude")?;
    let depth_km = coordinates.get(2).and_then(serde_json::Value::as_f64);

    let event = EarthquakeEvent {
        id,
        time,
        latitude,
        longitude,
        magnitude,
        magnitude_type: properties["magType"].as_str().map(String::from),
        depth_km,
        place: properties["place"]
            .as_str()
            .filter(|p| !p.is_empty())
            .map(String::from),
    };

    event.validate().map_err(|e| e.to_string())?;

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(id: &str, mag: serde_json::Value, lon: f64, lat: f64) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "id": id,
            "properties": {
                "mag": mag,
                "place": "10 km SSW of Ridgecrest, CA",
                "time": 1_704_812_345_678_i64,
                "type": "earthquake",
                "magType": "ml"
            },
            "geometry": { "type": "Point", "coordinates": [lon, lat, 8.2] }
        })
    }

    #[test]
    fn parses_earthquake_feature() {
        let event = parse_feature(&feature("ci40000001", serde_json::json!(2.4), -117.6, 35.6))
            .unwrap()
            .unwrap();
        assert_eq!(event.id, "ci40000001");
        assert_eq!(event.magnitude, Some(2.4));
        assert_eq!(event.magnitude_type.as_deref(), Some("ml"));
        assert!((event.longitude - -117.6).abs() < f64::EPSILON);
        assert!((event.latitude - 35.6).abs() < f64::EPSILON);
        assert_eq!(event.depth_km, Some(8.2));
        assert_eq!(event.time.to_rfc3339(), "2024-01-09T14:59:05.678+00:00");
    }

    #[test]
    fn keeps_unrated_events() {
        let event = parse_feature(&feature("ak1", serde_json::Value::Null, 150.0, 60.0))
            .unwrap()
            .unwrap();
        assert!(event.magnitude.is_none());
    }

    #[test]
    fn ignores_non_earthquake_types() {
        let mut blast = feature("uu1", serde_json::json!(1.1), -112.0, 40.5);
        blast["properties"]["type"] = serde_json::json!("quarry blast");
        assert_eq!(parse_feature(&blast), Ok(None));
    }

    #[test]
    fn rejects_out_of_range_records() {
        let negative = feature("nc1", serde_json::json!(-0.3), -122.0, 38.0);
        assert!(parse_feature(&negative).unwrap_err().contains("magnitude"));

        let bad_lat = feature("nc2", serde_json::json!(1.0), -122.0, 95.0);
        assert!(parse_feature(&bad_lat).unwrap_err().contains("latitude"));
    }

    #[test]
    fn collection_skips_malformed_and_keeps_order() {
        let mut no_geometry = feature("bad1", serde_json::json!(3.0), 0.0, 0.0);
        no_geometry["geometry"] = serde_json::Value::Null;
        let mut blast = feature("ex1", serde_json::json!(2.0), 10.0, 10.0);
        blast["properties"]["type"] = serde_json::json!("explosion");

        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                feature("b", serde_json::json!(4.2), 140.0, 36.0),
                no_geometry,
                blast,
                feature("a", serde_json::json!(1.5), -150.0, 61.0),
            ]
        });

        let fetched = parse_feature_collection(&body).unwrap();
        let ids: Vec<&str> = fetched.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(fetched.non_earthquake, 1);
        assert_eq!(fetched.malformed.len(), 1);
        assert_eq!(fetched.malformed[0].index, 1);
        assert_eq!(fetched.malformed[0].id.as_deref(), Some("bad1"));
    }

    #[test]
    fn empty_collection_is_valid() {
        let body = serde_json::json!({ "type": "FeatureCollection", "features": [] });
        let fetched = parse_feature_collection(&body).unwrap();
        assert!(fetched.events.is_empty());
        assert!(fetched.malformed.is_empty());
    }

    #[test]
    fn missing_features_array_is_an_error() {
        let body = serde_json::json!({ "error": "bad request" });
        assert!(matches!(
            parse_feature_collection(&body),
            Err(FetchError::InvalidResponse { .. })
        ));
    }
}

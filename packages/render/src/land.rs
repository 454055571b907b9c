//! Land and border outlines loaded from a `GeoJSON` asset.
//!
//! Any polygon, multi-polygon, or line geometry contributes its rings as
//! polylines; points are ignored. Natural Earth `ne_110m_land` and
//! `ne_110m_admin_0_boundary_lines_land` both load as-is.
//!
//! Without a configured file, [`LandLayer::builtin`] supplies country
//! outlines at roughly 1:110m scale, which draw both coastlines and land
//! borders.

use std::path::{Path, PathBuf};

use geojson::{GeoJson, Geometry, Value};

use crate::RenderError;

/// Name reported for the embedded outline asset.
pub const BUILTIN_NAME: &str = "<builtin world_countries.geojson>";

const BUILTIN_GEOJSON: &str = include_str!("../assets/world_countries.geojson");

/// A ring or line of `(longitude, latitude)` vertices.
pub type Polyline = Vec<(f64, f64)>;

/// Outline geometry drawn under the markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandLayer {
    /// All rings and lines, in file order.
    pub polylines: Vec<Polyline>,
}

impl LandLayer {
    /// Reads and parses a `GeoJSON` file.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Asset`] if the file cannot be read and
    /// [`RenderError::InvalidAsset`] if it is not usable `GeoJSON`.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::Asset {
            path: path.to_path_buf(),
            source,
        })?;

        let layer = Self::from_geojson_str(&text).map_err(|message| RenderError::InvalidAsset {
            path: path.to_path_buf(),
            message,
        })?;

        log::debug!(
            "Loaded {} outline polylines from {}",
            layer.polylines.len(),
            path.display()
        );
        Ok(layer)
    }

    /// Country outlines shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidAsset`] if the embedded asset does not
    /// parse.
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_geojson_str(BUILTIN_GEOJSON).map_err(|message| RenderError::InvalidAsset {
            path: PathBuf::from(BUILTIN_NAME),
            message,
        })
    }

    /// Parses `GeoJSON` text.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the text is not `GeoJSON`
    /// or contains no drawable geometry.
    pub fn from_geojson_str(text: &str) -> Result<Self, String> {
        let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| e.to_string())?;

        let mut layer = Self::default();
        match geojson {
            GeoJson::FeatureCollection(collection) => {
                for feature in collection.features {
                    if let Some(geometry) = feature.geometry {
                        layer.push_geometry(&geometry);
                    }
                }
            }
            GeoJson::Feature(feature) => {
                if let Some(geometry) = feature.geometry {
                    layer.push_geometry(&geometry);
                }
            }
            GeoJson::Geometry(geometry) => layer.push_geometry(&geometry),
        }

        if layer.polylines.is_empty() {
            return Err("no polygon or line geometry found".to_string());
        }
        Ok(layer)
    }

    fn push_geometry(&mut self, geometry: &Geometry) {
        match &geometry.value {
            Value::LineString(line) => self.push_line(line),
            Value::MultiLineString(lines) | Value::Polygon(lines) => {
                for line in lines {
                    self.push_line(line);
                }
            }
            Value::MultiPolygon(polygons) => {
                for line in polygons.iter().flatten() {
                    self.push_line(line);
                }
            }
            Value::GeometryCollection(geometries) => {
                for inner in geometries {
                    self.push_geometry(inner);
                }
            }
            Value::Point(_) | Value::MultiPoint(_) => {}
        }
    }

    fn push_line(&mut self, positions: &[Vec<f64>]) {
        let polyline: Polyline = positions
            .iter()
            .filter_map(|p| match p.as_slice() {
                [lon, lat, ..] => Some((*lon, *lat)),
                _ => None,
            })
            .collect();
        if polyline.len() >= 2 {
            self.polylines.push(polyline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_ISLAND: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [5, 5] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[20, 20], [30, 30]], [[40, 40]]]
                }
            }
        ]
    }"#;

    #[test]
    fn collects_rings_and_lines() {
        let layer = LandLayer::from_geojson_str(SQUARE_ISLAND).unwrap();
        assert_eq!(layer.polylines.len(), 2);
        assert_eq!(layer.polylines[0].len(), 5);
        assert_eq!(layer.polylines[1], vec![(20.0, 20.0), (30.0, 30.0)]);
    }

    #[test]
    fn builtin_outlines_cover_the_world() {
        let layer = LandLayer::builtin().unwrap();
        assert!(layer.polylines.len() > 180);

        let points = || layer.polylines.iter().flatten();
        assert!(points().all(|&(lon, lat)| (-180.0..=180.0).contains(&lon)
            && (-90.0..=90.0).contains(&lat)));
        assert!(points().any(|&(_, lat)| lat < -60.0));
        assert!(points().any(|&(_, lat)| lat > 70.0));
    }

    #[test]
    fn rejects_point_only_geojson() {
        let text = r#"{ "type": "Point", "coordinates": [1, 2] }"#;
        assert!(LandLayer::from_geojson_str(text).is_err());
    }

    #[test]
    fn rejects_non_geojson() {
        assert!(LandLayer::from_geojson_str("{\"hello\": 1}").is_err());
    }

    #[test]
    fn missing_file_is_an_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = LandLayer::load(&dir.path().join("missing.geojson"));
        assert!(matches!(result, Err(RenderError::Asset { .. })));
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("land.geojson");
        std::fs::write(&path, SQUARE_ISLAND).unwrap();
        let layer = LandLayer::load(&path).unwrap();
        assert_eq!(layer.polylines.len(), 2);
    }
}

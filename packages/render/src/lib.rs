#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! World map rendering and caption text for a day of earthquakes.
//!
//! [`render`] loads the configured assets and [`render_map`] draws every
//! event as a magnitude-colored marker on a world projection, then
//! overlays the [`DailySummary`] figures.
//! [`build_caption`] produces the post text from the same summary.
//!
//! Rendering is deterministic: it reads no clock and uses no randomness,
//! so the same events and summary always encode to the same PNG bytes.
//!
//! [`DailySummary`]: daily_quakes_quake_models::DailySummary

pub mod caption;
pub mod land;
pub mod map;
pub mod palette;
pub mod projection;
pub mod text;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use caption::build_caption;
pub use land::LandLayer;
pub use map::{render, render_map};
pub use projection::Projection;

/// Smallest accepted image width.
pub const MIN_WIDTH: u32 = 600;

/// Largest accepted image width.
pub const MAX_WIDTH: u32 = 8000;

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An asset file could not be read.
    #[error("failed to read asset {path}: {source}")]
    Asset {
        /// Path of the asset.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An asset file was read but is unusable.
    #[error("invalid asset {path}: {message}")]
    InvalidAsset {
        /// Path of the asset.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The requested canvas size is not supported.
    #[error("invalid canvas size {width}x{height}")]
    Canvas {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Image width in pixels; the height follows the projection's aspect
    /// ratio.
    pub width: u32,
    /// World projection.
    pub projection: Projection,
    /// Events below this magnitude are not drawn (still counted).
    pub min_display_magnitude: f64,
    /// `GeoJSON` file with land and border outlines. When unset, the
    /// built-in country outlines are drawn.
    pub land_geojson: Option<PathBuf>,
    /// Account handle printed under the data credit.
    pub handle: String,
    /// Data credit line.
    pub source_credit: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 2400,
            projection: Projection::Robinson,
            min_display_magnitude: 0.0,
            land_geojson: None,
            handle: "@TodayQuakes".to_string(),
            source_credit: "Data Source - USGS".to_string(),
        }
    }
}

impl RenderOptions {
    /// Image height for the configured width and projection.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn height(&self) -> u32 {
        (f64::from(self.width) / self.projection.aspect_ratio()).round() as u32
    }
}

/// A rendered map image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMap {
    /// PNG-encoded image.
    pub png: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

//! Whole-world map projections.
//!
//! Both projections map the full `[-180, 180] x [-90, 90]` range into the
//! unit box `[-1, 1] x [-1, 1]`, with `+y` pointing north.

use serde::{Deserialize, Serialize};

/// Robinson parallel-length (`X`) and parallel-distance (`Y`) tables,
/// sampled every 5 degrees of latitude from the equator to the pole.
const ROBINSON_X: [f64; 19] = [
    1.0000, 0.9986, 0.9954, 0.9900, 0.9822, 0.9730, 0.9600, 0.9427, 0.9216, 0.8962, 0.8679,
    0.8350, 0.7986, 0.7597, 0.7186, 0.6732, 0.6213, 0.5722, 0.5322,
];
const ROBINSON_Y: [f64; 19] = [
    0.0000, 0.0620, 0.1240, 0.1860, 0.2480, 0.3100, 0.3720, 0.4340, 0.4958, 0.5571, 0.6176,
    0.6769, 0.7346, 0.7903, 0.8435, 0.8936, 0.9394, 0.9761, 1.0000,
];

/// Map projection used for the base layer and markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Robinson pseudo-cylindrical projection.
    #[default]
    Robinson,
    /// Plate carrée: longitude and latitude map linearly to x and y.
    Equirectangular,
}

impl Projection {
    /// Projects a WGS84 coordinate into the unit box.
    ///
    /// Out-of-range input is clamped to the valid range first.
    #[must_use]
    pub fn project(self, longitude: f64, latitude: f64) -> (f64, f64) {
        let lon = longitude.clamp(-180.0, 180.0);
        let lat = latitude.clamp(-90.0, 90.0);

        match self {
            Self::Equirectangular => (lon / 180.0, lat / 90.0),
            Self::Robinson => {
                let (x_len, y_dist) = robinson_factors(lat.abs());
                (x_len * lon / 180.0, y_dist.copysign(lat))
            }
        }
    }

    /// Width-to-height ratio of the projected world.
    #[must_use]
    pub const fn aspect_ratio(self) -> f64 {
        match self {
            Self::Equirectangular => 2.0,
            // 0.8487 * pi / 1.3523
            Self::Robinson => 1.971_681,
        }
    }
}

/// Linearly interpolated Robinson table values for `|latitude|` in degrees.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn robinson_factors(abs_latitude: f64) -> (f64, f64) {
    let position = abs_latitude / 5.0;
    let index = (position.floor() as usize).min(ROBINSON_X.len() - 2);
    let frac = position - index as f64;

    let lerp = |table: &[f64; 19]| table[index] + (table[index + 1] - table[index]) * frac;
    (lerp(&ROBINSON_X), lerp(&ROBINSON_Y))
}

/// Maps unit-box coordinates onto a pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Converts a projected point into pixel coordinates.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_pixel(&self, (x, y): (f64, f64)) -> (f32, f32) {
        let px = f64::from(self.x) + (x + 1.0) / 2.0 * f64::from(self.width);
        let py = f64::from(self.y) + (1.0 - y) / 2.0 * f64::from(self.height);
        (px as f32, py as f32)
    }
}

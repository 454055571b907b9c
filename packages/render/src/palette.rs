//! Magnitude to marker color and size.
//!
//! Colors come from a discrete "hot" ramp (pale yellow, yellow, red, dark
//! red) split into [`BINS`] steps over `[0, MAX_MAGNITUDE]`. Both the bin
//! and the marker radius are monotonic in magnitude.

/// Magnitude mapped to the darkest color; anything above is clamped.
pub const MAX_MAGNITUDE: f64 = 9.0;

/// Number of discrete color steps.
pub const BINS: usize = 10;

/// Ramp stops as RGB.
const STOPS: [[u8; 3]; 4] = [
    [0xFF, 0xFF, 0x8B],
    [0xFF, 0xFF, 0x00],
    [0xCD, 0x00, 0x00],
    [0x43, 0x00, 0x00],
];

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Color bin for a magnitude, `0` for the weakest events.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn magnitude_bin(magnitude: f64) -> usize {
    let t = (magnitude / MAX_MAGNITUDE).clamp(0.0, 1.0);
    ((t * BINS as f64).floor() as usize).min(BINS - 1)
}

/// Color of one bin.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn bin_color(bin: usize) -> Rgb {
    let t = bin.min(BINS - 1) as f64 / (BINS - 1) as f64;
    let segments = (STOPS.len() - 1) as f64;
    let position = t * segments;
    let index = (position.floor() as usize).min(STOPS.len() - 2);
    let frac = position - index as f64;

    let channel = |c: usize| {
        let from = f64::from(STOPS[index][c]);
        let to = f64::from(STOPS[index + 1][c]);
        (from + (to - from) * frac).round() as u8
    };

    Rgb(channel(0), channel(1), channel(2))
}

/// Marker color for a magnitude.
#[must_use]
pub fn magnitude_color(magnitude: f64) -> Rgb {
    bin_color(magnitude_bin(magnitude))
}

/// Marker radius in pixels at the reference width, before scaling.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn marker_radius(magnitude: f64) -> f32 {
    (3.0 + 1.5 * magnitude.clamp(0.0, MAX_MAGNITUDE + 1.0)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints_match_stops() {
        assert_eq!(bin_color(0), Rgb(0xFF, 0xFF, 0x8B));
        assert_eq!(bin_color(BINS - 1), Rgb(0x43, 0x00, 0x00));
    }

    #[test]
    fn bins_cover_range_monotonically() {
        assert_eq!(magnitude_bin(0.0), 0);
        assert_eq!(magnitude_bin(MAX_MAGNITUDE), BINS - 1);
        assert_eq!(magnitude_bin(12.0), BINS - 1);

        let mut previous_bin = 0;
        let mut previous_radius = 0.0;
        for step in 0..=100 {
            let magnitude = f64::from(step) / 10.0;
            let bin = magnitude_bin(magnitude);
            let radius = marker_radius(magnitude);
            assert!(bin >= previous_bin, "bin decreased at {magnitude}");
            assert!(radius > previous_radius, "radius not increasing at {magnitude}");
            previous_bin = bin;
            previous_radius = radius;
        }
    }

    #[test]
    fn hotter_bins_are_darker_or_redder() {
        // Blue fades out first, then green, then red: no channel ever
        // increases along the ramp.
        for bin in 1..BINS {
            let Rgb(r0, g0, b0) = bin_color(bin - 1);
            let Rgb(r1, g1, b1) = bin_color(bin);
            assert!(r1 <= r0 && g1 <= g0 && b1 <= b0, "bin {bin} is lighter");
        }
    }
}

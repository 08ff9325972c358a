//! Discrete temperature color scale.
//!
//! One color per band between consecutive bounds. The color of a band is
//! derived from its lower edge with one of four piecewise rules:
//!
//! | lower edge       | fraction `t`         | color                                   |
//! |------------------|----------------------|-----------------------------------------|
//! | `< -10`          | `(b + 40) / 30`      | pink (255,0,203) toward (255,192,255)   |
//! | `-10 ..= 0`      | `(b + 10) / 10`      | R,G fixed at (69,117), B 180 toward 255 |
//! | `0 < b <= 10`    | `b / 10`             | green (145,207,96) toward (254,224,139) |
//! | `> 10`           | `(b - 10) / 30`      | constant red (165,0,38)                 |
//!
//! The second and fourth rules hold some or all channels constant regardless
//! of `t`; the scale keeps them that way.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::classify::classify;
use crate::RenderError;

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

/// Serialized as `{ r, g, b, hex }` for the legend.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Color", 4)?;
        state.serialize_field("r", &self.r)?;
        state.serialize_field("g", &self.g)?;
        state.serialize_field("b", &self.b)?;
        state.serialize_field("hex", &self.to_hex())?;
        state.end()
    }
}

/// One interval `[lower, upper)` of the scale and its color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorBand {
    pub lower: f64,
    pub upper: f64,
    pub color: Color,
}

/// Bounds of the 850 hPa temperature scale: -40 to 40 °C in 2 °C steps.
pub fn temperature_bounds() -> Vec<f64> {
    (0..=40).map(|i| -40.0 + 2.0 * f64::from(i)).collect()
}

/// Truncate a channel value into a byte.
fn channel(value: f64) -> u8 {
    value.floor().clamp(0.0, 255.0) as u8
}

/// Color for a band whose lower edge is `lower`.
pub fn band_color(lower: f64) -> Color {
    if lower < -10.0 {
        let t = (lower + 40.0) / 30.0;
        Color::new(255, channel(192.0 * t), channel(203.0 * (1.0 - t) + 255.0 * t))
    } else if lower <= 0.0 {
        let t = (lower + 10.0) / 10.0;
        // Blue rises 180 -> 255 toward 0 °C. Plots from 850.py use
        // 180 + t*(180-255) and fade toward 105 here; not reproduced.
        Color::new(69, 117, channel(180.0 + t * (255.0 - 180.0)))
    } else if lower <= 10.0 {
        let t = lower / 10.0;
        Color::new(
            channel(145.0 + t * (254.0 - 145.0)),
            channel(207.0 + t * (224.0 - 207.0)),
            channel(96.0 + t * (139.0 - 96.0)),
        )
    } else {
        Color::new(165, 0, 38)
    }
}

/// Build one band per consecutive pair of bounds.
///
/// Returns `bounds.len() - 1` contiguous bands, or none for fewer than two
/// bounds.
pub fn build_color_bands(bounds: &[f64]) -> Vec<ColorBand> {
    bounds
        .windows(2)
        .map(|pair| ColorBand {
            lower: pair[0],
            upper: pair[1],
            color: band_color(pair[0]),
        })
        .collect()
}

/// Validated, immutable color scale shared by the classifier, the mesh and
/// the colorbar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBandTable {
    bands: Vec<ColorBand>,
}

impl ColorBandTable {
    /// Build a table from strictly increasing, finite bounds (at least two).
    pub fn from_bounds(bounds: &[f64]) -> Result<Self, RenderError> {
        if bounds.len() < 2 {
            return Err(RenderError::InvalidBounds(format!(
                "need at least 2 bounds, got {}",
                bounds.len()
            )));
        }
        if let Some(bad) = bounds.iter().find(|b| !b.is_finite()) {
            return Err(RenderError::InvalidBounds(format!("non-finite bound {}", bad)));
        }
        if let Some(pair) = bounds.windows(2).find(|w| w[0] >= w[1]) {
            return Err(RenderError::InvalidBounds(format!(
                "bounds not strictly increasing at {} -> {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            bands: build_color_bands(bounds),
        })
    }

    /// The -40..40 °C table.
    pub fn temperature() -> Self {
        Self {
            bands: build_color_bands(&temperature_bounds()),
        }
    }

    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// All band edges, lowest first.
    pub fn bounds(&self) -> Vec<f64> {
        let mut bounds: Vec<f64> = self.bands.iter().map(|b| b.lower).collect();
        if let Some(last) = self.bands.last() {
            bounds.push(last.upper);
        }
        bounds
    }

    /// `(lowest bound, highest bound)`.
    pub fn value_range(&self) -> (f64, f64) {
        match (self.bands.first(), self.bands.last()) {
            (Some(first), Some(last)) => (first.lower, last.upper),
            _ => (0.0, 0.0),
        }
    }

    /// Band index for a value; see [`classify`].
    pub fn classify(&self, value: f64) -> usize {
        classify(&self.bands, value).unwrap_or(0)
    }

    /// Color of the band containing `value`.
    pub fn color_for(&self, value: f64) -> Color {
        self.bands[self.classify(value)].color
    }

    pub fn colors(&self) -> Vec<Color> {
        self.bands.iter().map(|b| b.color).collect()
    }
}

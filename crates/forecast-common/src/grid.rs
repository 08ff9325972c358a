//! Decoded grid samples and the data source seam.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GridError, GridResult};

/// Offset between Kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f32 = 273.15;

/// Convert a Kelvin value to degrees Celsius.
#[inline]
pub fn kelvin_to_celsius(kelvin: f32) -> f32 {
    kelvin - KELVIN_OFFSET
}

/// Selects one vertical level out of a multi-level forecast file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelSelector {
    /// Level type name, e.g. `isobaricInhPa`
    pub level_type: String,
    /// Level value in the units implied by the level type
    pub level: u32,
}

impl LevelSelector {
    /// Isobaric surface in hectopascals.
    pub fn isobaric_hpa(level: u32) -> Self {
        Self {
            level_type: "isobaricInhPa".to_string(),
            level,
        }
    }

    /// The 850 hPa surface.
    pub fn isobaric_850() -> Self {
        Self::isobaric_hpa(850)
    }
}

/// A 2-D grid of values with its coordinate axes.
///
/// Values are row-major: `lats.len()` rows of `lons.len()` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSample {
    pub values: Vec<f32>,
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
}

impl GridSample {
    /// Build a sample, checking the value count against the axes.
    pub fn new(values: Vec<f32>, lons: Vec<f64>, lats: Vec<f64>) -> GridResult<Self> {
        if values.len() != lons.len() * lats.len() {
            return Err(GridError::ShapeMismatch {
                values: values.len(),
                rows: lats.len(),
                cols: lons.len(),
            });
        }
        Ok(Self { values, lons, lats })
    }

    /// Number of columns (longitude points).
    pub fn width(&self) -> usize {
        self.lons.len()
    }

    /// Number of rows (latitude points).
    pub fn height(&self) -> usize {
        self.lats.len()
    }

    /// Value at row `j`, column `i`.
    pub fn value(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.width() || j >= self.height() {
            return None;
        }
        self.values.get(j * self.width() + i).copied()
    }

    /// Convert every value from Kelvin to degrees Celsius.
    pub fn into_celsius(mut self) -> Self {
        for v in &mut self.values {
            *v = kelvin_to_celsius(*v);
        }
        self
    }

    /// Minimum and maximum of the non-NaN values.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of missing (NaN) values.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

/// Decodes one forecast file into a grid sample for a single level.
///
/// Values are returned in the file's native units (Kelvin for temperature).
pub trait GridDataSource: Send + Sync {
    fn load(&self, path: &Path, level: &LevelSelector) -> GridResult<GridSample>;
}

impl<T: GridDataSource + ?Sized> GridDataSource for std::sync::Arc<T> {
    fn load(&self, path: &Path, level: &LevelSelector) -> GridResult<GridSample> {
        (**self).load(path, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_to_celsius_freezing_point() {
        assert!((kelvin_to_celsius(273.15) - 0.0).abs() < 1e-6);
        assert!((kelvin_to_celsius(293.15) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = GridSample::new(vec![0.0; 5], vec![0.0, 1.0], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, GridError::ShapeMismatch { values: 5, rows: 2, cols: 2 }));
    }

    #[test]
    fn test_value_lookup_row_major() {
        let sample = GridSample::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![0.0, 1.0, 2.0],
            vec![10.0, 9.0],
        )
        .unwrap();
        assert_eq!(sample.value(0, 0), Some(1.0));
        assert_eq!(sample.value(2, 0), Some(3.0));
        assert_eq!(sample.value(0, 1), Some(4.0));
        assert_eq!(sample.value(3, 0), None);
    }

    #[test]
    fn test_into_celsius_and_stats() {
        let sample = GridSample::new(
            vec![273.15, f32::NAN, 263.15, 283.15],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        )
        .unwrap()
        .into_celsius();

        let (lo, hi) = sample.value_range().unwrap();
        assert!((lo + 10.0).abs() < 1e-4);
        assert!((hi - 10.0).abs() < 1e-4);
        assert_eq!(sample.missing_count(), 1);
    }

    #[test]
    fn test_level_selector_850() {
        let level = LevelSelector::isobaric_850();
        assert_eq!(level.level_type, "isobaricInhPa");
        assert_eq!(level.level, 850);
    }
}

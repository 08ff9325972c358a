//! Classified color mesh over a lon/lat grid.

use rayon::prelude::*;

use forecast_common::bbox::normalize_longitude;
use forecast_common::GridSample;

use crate::colorbands::{Color, ColorBandTable};

/// Samples at or above this count are classified in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// Grid of band colors aligned to longitude/latitude axes.
///
/// `cells` is row-major like the source sample; `None` marks missing data.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredMesh {
    /// Longitudes wrapped into [-180, 180)
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub cells: Vec<Option<Color>>,
}

impl ColoredMesh {
    /// Classify every value of a (Celsius) sample through the band table.
    pub fn from_sample(sample: &GridSample, table: &ColorBandTable) -> Self {
        let classify = |v: &f32| {
            if v.is_nan() {
                None
            } else {
                Some(table.color_for(f64::from(*v)))
            }
        };

        let cells = if sample.values.len() >= PARALLEL_THRESHOLD {
            sample.values.par_iter().map(classify).collect()
        } else {
            sample.values.iter().map(classify).collect()
        };

        Self {
            lons: sample.lons.iter().copied().map(normalize_longitude).collect(),
            lats: sample.lats.clone(),
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.lons.len()
    }

    pub fn height(&self) -> usize {
        self.lats.len()
    }

    /// Color at column `i`, row `j`.
    pub fn cell(&self, i: usize, j: usize) -> Option<Color> {
        if i >= self.width() || j >= self.height() {
            return None;
        }
        self.cells.get(j * self.width() + i).copied().flatten()
    }
}

/// Distance between two longitudes, accounting for the dateline.
fn longitude_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// For each target coordinate, the index of the nearest axis point, or
/// `None` when the target lies farther than half a grid step outside the axis
/// (shading="nearest" semantics).
///
/// `periodic` treats the axis as longitudes.
pub fn nearest_indices(axis: &[f64], targets: &[f64], periodic: bool) -> Vec<Option<usize>> {
    let distance = |a: f64, b: f64| {
        if periodic {
            longitude_distance(a, b)
        } else {
            (a - b).abs()
        }
    };

    let max_step = axis
        .windows(2)
        .map(|w| distance(w[0], w[1]))
        .fold(0.0f64, f64::max);
    let tolerance = if axis.len() < 2 {
        f64::INFINITY
    } else {
        max_step / 2.0 + 1e-9
    };

    targets
        .iter()
        .map(|&target| {
            axis.iter()
                .enumerate()
                .map(|(idx, &value)| (idx, distance(value, target)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .filter(|(_, d)| *d <= tolerance)
                .map(|(idx, _)| idx)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(values: Vec<f32>, lons: Vec<f64>, lats: Vec<f64>) -> GridSample {
        GridSample::new(values, lons, lats).unwrap()
    }

    #[test]
    fn test_mesh_colors_follow_bands() {
        let table = ColorBandTable::temperature();
        let mesh = ColoredMesh::from_sample(
            &sample(vec![-40.0, 0.0, 12.5, f32::NAN], vec![10.0, 11.0], vec![45.0, 44.0]),
            &table,
        );

        assert_eq!(mesh.cell(0, 0), Some(Color::new(255, 0, 203)));
        assert_eq!(mesh.cell(1, 0), Some(Color::new(69, 117, 255)));
        assert_eq!(mesh.cell(0, 1), Some(Color::new(165, 0, 38)));
        assert_eq!(mesh.cell(1, 1), None);
        assert_eq!(mesh.cell(2, 0), None);
    }

    #[test]
    fn test_mesh_wraps_longitudes() {
        let table = ColorBandTable::temperature();
        let mesh = ColoredMesh::from_sample(
            &sample(vec![0.0; 3], vec![0.0, 180.0, 340.0], vec![50.0]),
            &table,
        );
        assert_eq!(mesh.lons, vec![0.0, -180.0, -20.0]);
    }

    #[test]
    fn test_large_mesh_matches_sequential() {
        let table = ColorBandTable::temperature();
        let values: Vec<f32> = (0..100 * 50).map(|i| (i % 90) as f32 - 45.0).collect();
        let lons: Vec<f64> = (0..100).map(f64::from).collect();
        let lats: Vec<f64> = (0..50).map(f64::from).collect();
        let mesh = ColoredMesh::from_sample(&sample(values.clone(), lons, lats), &table);

        for (cell, v) in mesh.cells.iter().zip(&values) {
            assert_eq!(*cell, Some(table.color_for(f64::from(*v))));
        }
    }

    #[test]
    fn test_nearest_indices_linear() {
        let axis = [60.0, 59.0, 58.0];
        let idx = nearest_indices(&axis, &[60.2, 59.4, 58.6, 57.0, 61.0], false);
        assert_eq!(idx, vec![Some(0), Some(1), Some(2), None, None]);
    }

    #[test]
    fn test_nearest_indices_across_dateline() {
        // Global 90-degree grid: 0, 90, -180, -90 after wrapping.
        let axis = [0.0, 90.0, -180.0, -90.0];
        let idx = nearest_indices(&axis, &[-20.0, 179.0, -50.0], true);
        assert_eq!(idx, vec![Some(0), Some(2), Some(3)]);
    }

    #[test]
    fn test_nearest_indices_single_point() {
        assert_eq!(nearest_indices(&[5.0], &[-100.0, 100.0], false), vec![Some(0), Some(0)]);
        assert_eq!(nearest_indices(&[], &[1.0], false), vec![None]);
    }
}

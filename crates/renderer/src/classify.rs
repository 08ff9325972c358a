//! Boundary-norm classification of continuous values into color bands.

use crate::colorbands::ColorBand;

/// Index of the band whose `[lower, upper)` interval contains `value`.
///
/// A value equal to a boundary belongs to the band starting at it. Values
/// below the first bound clamp to the first band, values at or above the last
/// bound clamp to the last band. NaN lands in the first band; callers that
/// care about missing data filter it first.
///
/// Returns `None` only for an empty band list.
pub fn classify(bands: &[ColorBand], value: f64) -> Option<usize> {
    if bands.is_empty() {
        return None;
    }
    let starts_at_or_below = bands.partition_point(|band| band.lower <= value);
    Some(starts_at_or_below.saturating_sub(1).min(bands.len() - 1))
}

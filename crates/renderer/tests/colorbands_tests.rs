//! Tests for the discrete color scale and classification.

use renderer::colorbands::band_color;
use renderer::{build_color_bands, temperature_bounds, Color, ColorBandTable, RenderError};

// ============================================================================
// Band construction
// ============================================================================

#[test]
fn test_temperature_bounds() {
    let bounds = temperature_bounds();
    assert_eq!(bounds.len(), 41);
    assert_eq!(bounds[0], -40.0);
    assert_eq!(bounds[40], 40.0);
    assert!(bounds.windows(2).all(|w| (w[1] - w[0] - 2.0).abs() < 1e-12));
}

#[test]
fn test_bands_are_contiguous() {
    let bound_lists: Vec<Vec<f64>> = vec![
        temperature_bounds(),
        vec![-12.0, -10.0, -8.0, -6.0],
        vec![-2.0, 0.0, 2.0, 4.0],
        vec![8.0, 10.0, 12.0, 14.0],
        vec![-11.0, -9.0, -1.0, 1.0, 9.0, 11.0],
        vec![-40.0, -10.5, -10.0, 0.0, 0.5, 10.0, 10.5, 40.0],
        vec![-60.0, 60.0],
        (0..16).map(|i| -15.0 + 2.0 * f64::from(i)).collect(),
    ];

    for bounds in &bound_lists {
        let bands = build_color_bands(bounds);
        assert_eq!(bands.len(), bounds.len() - 1, "bounds {bounds:?}");
        for pair in bands.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower, "bounds {bounds:?}");
        }
        for (band, window) in bands.iter().zip(bounds.windows(2)) {
            assert_eq!((band.lower, band.upper), (window[0], window[1]));
            assert_eq!(band.color, band_color(band.lower));
        }
        assert_eq!(bands[0].lower, bounds[0]);
        assert_eq!(bands[bands.len() - 1].upper, bounds[bounds.len() - 1]);
    }
}

#[test]
fn test_fewer_than_two_bounds_gives_no_bands() {
    assert!(build_color_bands(&[]).is_empty());
    assert!(build_color_bands(&[5.0]).is_empty());
}

#[test]
fn test_reference_colors() {
    let expected = [
        (-40.0, Color::new(255, 0, 203)),
        (-38.0, Color::new(255, 12, 206)),
        (-20.0, Color::new(255, 128, 237)),
        (-12.0, Color::new(255, 179, 251)),
        (-10.0, Color::new(69, 117, 180)),
        (-8.0, Color::new(69, 117, 195)),
        (0.0, Color::new(69, 117, 255)),
        (2.0, Color::new(166, 210, 104)),
        (4.0, Color::new(188, 213, 113)),
        (10.0, Color::new(254, 224, 139)),
        (12.0, Color::new(165, 0, 38)),
        (38.0, Color::new(165, 0, 38)),
    ];
    for (lower, color) in expected {
        assert_eq!(band_color(lower), color, "lower edge {}", lower);
    }
}

#[test]
fn test_blue_range_keeps_red_green_fixed() {
    for lower in [-10.0, -8.0, -6.0, -4.0, -2.0, 0.0] {
        let c = band_color(lower);
        assert_eq!((c.r, c.g), (69, 117));
    }
}

#[test]
fn test_warm_range_is_constant() {
    let table = ColorBandTable::temperature();
    let warm: Vec<Color> = table
        .bands()
        .iter()
        .filter(|b| b.lower > 10.0)
        .map(|b| b.color)
        .collect();
    assert_eq!(warm.len(), 14);
    assert!(warm.iter().all(|c| *c == Color::new(165, 0, 38)));
}

// ============================================================================
// Table validation
// ============================================================================

#[test]
fn test_table_rejects_bad_bounds() {
    assert!(matches!(
        ColorBandTable::from_bounds(&[1.0]),
        Err(RenderError::InvalidBounds(_))
    ));
    assert!(matches!(
        ColorBandTable::from_bounds(&[0.0, 2.0, 2.0]),
        Err(RenderError::InvalidBounds(_))
    ));
    assert!(matches!(
        ColorBandTable::from_bounds(&[0.0, f64::NAN]),
        Err(RenderError::InvalidBounds(_))
    ));
}

#[test]
fn test_table_bounds_roundtrip() {
    let table = ColorBandTable::from_bounds(&[-5.0, 0.0, 5.0]).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.bounds(), vec![-5.0, 0.0, 5.0]);
    assert_eq!(table.value_range(), (-5.0, 5.0));
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_boundary_belongs_to_upper_band() {
    let table = ColorBandTable::temperature();
    assert_eq!(table.classify(-40.0), 0);
    assert_eq!(table.classify(-38.0), 1);
    assert_eq!(table.classify(-38.0001), 0);
    assert_eq!(table.classify(0.0), 20);
    assert_eq!(table.color_for(0.0), Color::new(69, 117, 255));
    assert_eq!(table.color_for(-0.5), band_color(-2.0));
}

#[test]
fn test_out_of_range_values_clamp() {
    let table = ColorBandTable::temperature();
    assert_eq!(table.classify(-55.0), 0);
    assert_eq!(table.classify(40.0), 39);
    assert_eq!(table.classify(61.3), 39);
    assert_eq!(table.color_for(-55.0), Color::new(255, 0, 203));
    assert_eq!(table.color_for(61.3), Color::new(165, 0, 38));
}

#[test]
fn test_table_serializes_bands() {
    let table = ColorBandTable::from_bounds(&[10.0, 12.0]).unwrap();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["bands"][0]["lower"], 10.0);
    assert_eq!(json["bands"][0]["color"]["r"], 254);
    assert_eq!(json["bands"][0]["color"]["hex"], "#fee08b");
}

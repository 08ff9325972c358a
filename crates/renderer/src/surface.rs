//! Drawing surface and basemap seams used by the frame renderer.

use forecast_common::BoundingBox;

use crate::colorbands::{Color, ColorBandTable};
use crate::mesh::ColoredMesh;

/// Map projection of the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Equirectangular lon/lat
    PlateCarree,
}

/// Physical feature layers drawn by the basemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Land,
    Ocean,
    Lakes,
    Rivers,
    Coastline,
    Borders,
}

/// Level of detail of feature geometry (Natural Earth scales).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureResolution {
    /// 1:10m
    Fine,
    /// 1:50m
    Medium,
    /// 1:110m
    Coarse,
}

impl FeatureResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureResolution::Fine => "10m",
            FeatureResolution::Medium => "50m",
            FeatureResolution::Coarse => "110m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// Fill and stroke of one feature layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub fill: Option<Color>,
    pub line_color: Color,
    pub line_width: f32,
    pub line_style: LineStyle,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            fill: None,
            line_color: Color::new(0, 0, 0),
            line_width: 1.0,
            line_style: LineStyle::Solid,
        }
    }
}

/// One named basemap layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureLayer {
    pub kind: FeatureKind,
    pub resolution: FeatureResolution,
    pub style: LayerStyle,
}

/// Named colors used by the default basemap.
pub mod colors {
    use crate::colorbands::Color;

    pub const WHITESMOKE: Color = Color::new(245, 245, 245);
    pub const LIGHTBLUE: Color = Color::new(173, 216, 230);
    pub const RIVER_BLUE: Color = Color::new(102, 153, 204);
    pub const GRAY: Color = Color::new(128, 128, 128);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
}

/// Land, ocean, lakes, rivers, coastline and borders at 1:10m.
pub fn default_feature_layers() -> Vec<FeatureLayer> {
    let layer = |kind, style| FeatureLayer {
        kind,
        resolution: FeatureResolution::Fine,
        style,
    };
    vec![
        layer(
            FeatureKind::Land,
            LayerStyle {
                fill: Some(colors::WHITESMOKE),
                ..LayerStyle::default()
            },
        ),
        layer(
            FeatureKind::Ocean,
            LayerStyle {
                fill: Some(colors::LIGHTBLUE),
                ..LayerStyle::default()
            },
        ),
        layer(
            FeatureKind::Lakes,
            LayerStyle {
                fill: Some(colors::LIGHTBLUE),
                ..LayerStyle::default()
            },
        ),
        layer(
            FeatureKind::Rivers,
            LayerStyle {
                line_color: colors::RIVER_BLUE,
                ..LayerStyle::default()
            },
        ),
        layer(FeatureKind::Coastline, LayerStyle::default()),
        layer(
            FeatureKind::Borders,
            LayerStyle {
                line_style: LineStyle::Dotted,
                ..LayerStyle::default()
            },
        ),
    ]
}

/// Coordinate gridline appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridlineStyle {
    /// Spacing between lines in degrees
    pub spacing: f64,
    pub color: Color,
    pub alpha: f32,
    pub line_width: f32,
    pub line_style: LineStyle,
    pub labels_top: bool,
    pub labels_right: bool,
    pub labels_bottom: bool,
    pub labels_left: bool,
    pub label_size: f32,
}

impl Default for GridlineStyle {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            color: colors::GRAY,
            alpha: 0.5,
            line_width: 0.5,
            line_style: LineStyle::Dashed,
            labels_top: false,
            labels_right: false,
            labels_bottom: true,
            labels_left: true,
            label_size: 10.0,
        }
    }
}

/// A surface the frame renderer paints one frame onto.
///
/// The surface is reused across frames: every render starts with
/// [`clear`](DrawingSurface::clear) and ends with
/// [`present`](DrawingSurface::present).
pub trait DrawingSurface {
    /// Handle to the legend, kept alive across frames.
    type ColorBar;

    /// Remove everything drawn by the previous frame.
    fn clear(&mut self);

    /// Fix the geographic extent and projection of the plot area.
    fn set_extent(&mut self, extent: &BoundingBox, projection: Projection);

    fn draw_mesh(&mut self, mesh: &ColoredMesh);

    /// Attach a new colorbar bound to `table`. Called once per surface.
    fn create_colorbar(&mut self, table: &ColorBandTable, label: &str) -> Self::ColorBar;

    /// Redraw an existing colorbar for `table`.
    fn refresh_colorbar(&mut self, colorbar: &mut Self::ColorBar, table: &ColorBandTable);

    fn draw_gridlines(&mut self, style: &GridlineStyle);

    fn set_title(&mut self, title: &str);

    /// Make the painted frame visible.
    fn present(&mut self);
}

/// Draws background geography onto a surface.
pub trait BasemapRenderer<S: ?Sized> {
    fn draw(
        &self,
        surface: &mut S,
        extent: &BoundingBox,
        projection: Projection,
        layers: &[FeatureLayer],
    );
}

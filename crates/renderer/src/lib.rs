//! Rendering for the forecast viewer.
//!
//! Turns a decoded temperature grid into a map frame:
//! - Discrete color bands and value classification
//! - Colored mesh over the lon/lat grid
//! - Drawing surface and basemap seams, with an in-memory raster backend
//! - Frame composition (basemap, mesh, colorbar, gridlines, title)
//! - PNG encoding of presented frames

pub mod classify;
pub mod colorbands;
pub mod error;
pub mod frame;
pub mod mesh;
pub mod png;
pub mod raster;
pub mod surface;
pub mod text;

pub use classify::classify;
pub use colorbands::{build_color_bands, temperature_bounds, Color, ColorBand, ColorBandTable};
pub use error::RenderError;
pub use frame::{default_extent, FrameRenderer, MapConfig, RenderState, RenderedFrame};
pub use mesh::ColoredMesh;
pub use raster::{FlatBasemap, RasterColorBar, RasterSurface};
pub use surface::{BasemapRenderer, DrawingSurface, FeatureLayer, GridlineStyle, Projection};
pub use text::TextRenderer;

//! Frame renderer: one forecast frame onto a reusable drawing surface.
//!
//! A render either fully repaints the surface or leaves it untouched. The
//! grid is loaded before anything is cleared, so a failed decode keeps the
//! last good frame on screen.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use forecast_common::{
    BoundingBox, ForecastCatalog, ForecastFrame, GridDataSource, LevelSelector,
};

use crate::colorbands::ColorBandTable;
use crate::error::RenderError;
use crate::mesh::ColoredMesh;
use crate::surface::{
    default_feature_layers, BasemapRenderer, DrawingSurface, FeatureLayer, GridlineStyle,
    Projection,
};

/// Longitude -20..50, latitude 25..60.
pub fn default_extent() -> BoundingBox {
    BoundingBox::new(-20.0, 25.0, 50.0, 60.0)
}

/// Fixed map composition applied to every frame.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub extent: BoundingBox,
    pub projection: Projection,
    pub layers: Vec<FeatureLayer>,
    pub level: LevelSelector,
    pub gridlines: GridlineStyle,
    pub colorbar_label: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            extent: default_extent(),
            projection: Projection::PlateCarree,
            layers: default_feature_layers(),
            level: LevelSelector::isobaric_850(),
            gridlines: GridlineStyle::default(),
            colorbar_label: "°C".to_string(),
        }
    }
}

impl MapConfig {
    /// Two-line title for a frame.
    pub fn title(&self, frame: &ForecastFrame) -> String {
        format!(
            "{} hPa Temperature (°C)\nForecast: {}",
            self.level.level,
            frame.valid_time.display()
        )
    }
}

/// Summary of a successfully rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFrame {
    pub index: usize,
    pub file_name: String,
    pub forecast_time: DateTime<Utc>,
    pub title: String,
    pub min_celsius: Option<f32>,
    pub max_celsius: Option<f32>,
    pub missing_values: usize,
}

/// Mutable render state owned by the controller.
///
/// Holds the one drawing surface and its colorbar. The colorbar is created
/// by the first successful render and only refreshed afterwards.
pub struct RenderState<S: DrawingSurface> {
    surface: S,
    colorbar: Option<S::ColorBar>,
    current: Option<RenderedFrame>,
}

impl<S: DrawingSurface> RenderState<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            colorbar: None,
            current: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn colorbar(&self) -> Option<&S::ColorBar> {
        self.colorbar.as_ref()
    }

    /// The frame currently on screen.
    pub fn current_frame(&self) -> Option<&RenderedFrame> {
        self.current.as_ref()
    }
}

/// Composes basemap, colored mesh, colorbar, gridlines and title.
pub struct FrameRenderer<G, B> {
    source: G,
    basemap: B,
    config: MapConfig,
}

impl<G, B> FrameRenderer<G, B>
where
    G: GridDataSource,
{
    pub fn new(source: G, basemap: B, config: MapConfig) -> Self {
        Self {
            source,
            basemap,
            config,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn source(&self) -> &G {
        &self.source
    }

    /// Render frame `index` of `catalog` onto `state`'s surface.
    pub fn render<S>(
        &self,
        index: usize,
        catalog: &ForecastCatalog,
        table: &ColorBandTable,
        state: &mut RenderState<S>,
    ) -> Result<RenderedFrame, RenderError>
    where
        S: DrawingSurface,
        B: BasemapRenderer<S>,
    {
        let started = Instant::now();
        let frame = catalog.get(index).ok_or(RenderError::IndexOutOfRange {
            index,
            len: catalog.len(),
        })?;

        let sample = match self.source.load(&frame.source_path, &self.config.level) {
            Ok(sample) => sample.into_celsius(),
            Err(source) => {
                warn!(
                    index,
                    path = %frame.source_path.display(),
                    error = %source,
                    "Frame load failed, keeping previous frame"
                );
                return Err(RenderError::FrameLoad {
                    path: frame.source_path.clone(),
                    source,
                });
            }
        };
        let loaded = started.elapsed();

        let mesh = ColoredMesh::from_sample(&sample, table);
        let title = self.config.title(frame);

        let surface = &mut state.surface;
        surface.clear();
        surface.set_extent(&self.config.extent, self.config.projection);
        self.basemap.draw(
            surface,
            &self.config.extent,
            self.config.projection,
            &self.config.layers,
        );
        surface.draw_mesh(&mesh);

        match state.colorbar.as_mut() {
            Some(colorbar) => surface.refresh_colorbar(colorbar, table),
            None => {
                debug!("Creating colorbar");
                state.colorbar = Some(surface.create_colorbar(table, &self.config.colorbar_label));
            }
        }

        surface.draw_gridlines(&self.config.gridlines);
        surface.set_title(&title);
        surface.present();

        let range = sample.value_range();
        let rendered = RenderedFrame {
            index,
            file_name: frame.file_name(),
            forecast_time: frame.forecast_time(),
            title,
            min_celsius: range.map(|(lo, _)| lo),
            max_celsius: range.map(|(_, hi)| hi),
            missing_values: sample.missing_count(),
        };

        info!(
            index,
            file = %rendered.file_name,
            forecast_time = %rendered.forecast_time,
            load_ms = loaded.as_millis() as u64,
            total_ms = started.elapsed().as_millis() as u64,
            "Rendered frame"
        );

        state.current = Some(rendered.clone());
        Ok(rendered)
    }
}

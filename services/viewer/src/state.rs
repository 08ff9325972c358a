//! Application state shared by the HTTP handlers.

use std::sync::Arc;
use tracing::info;

use forecast_common::{ForecastCatalog, GridDataSource};
use grib_source::{GribGridSource, TimeoutGridSource};
use renderer::{
    ColorBandTable, FlatBasemap, FrameRenderer, MapConfig, RasterSurface, TextRenderer,
};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::listing::load_catalog;
use crate::scrub::ScrubController;

pub type ViewerController = ScrubController<Arc<dyn GridDataSource>, FlatBasemap, RasterSurface>;

pub struct AppState {
    pub controller: Arc<ViewerController>,
}

impl AppState {
    pub fn new(
        catalog: ForecastCatalog,
        source: Arc<dyn GridDataSource>,
        surface: RasterSurface,
    ) -> Self {
        Self::with_map(catalog, source, surface, MapConfig::default())
    }

    pub fn with_map(
        catalog: ForecastCatalog,
        source: Arc<dyn GridDataSource>,
        surface: RasterSurface,
        map: MapConfig,
    ) -> Self {
        let renderer = FrameRenderer::new(source, FlatBasemap, map);
        let controller =
            ScrubController::new(catalog, ColorBandTable::temperature(), renderer, surface);
        Self {
            controller: Arc::new(controller),
        }
    }

    /// List the data directory, open the GRIB2 source and size the canvas.
    pub fn from_config(config: &ViewerConfig) -> Result<Self, ViewerError> {
        let catalog = load_catalog(&config.data_dir, &config.extension, config.malformed)?;

        let source: Arc<dyn GridDataSource> = Arc::new(TimeoutGridSource::new(
            GribGridSource::temperature(),
            config.decode_timeout,
        ));

        let mut surface = RasterSurface::new(config.width, config.height);
        if let Some(font) = &config.font {
            surface = surface.with_text(TextRenderer::from_file(font)?);
            info!(font = %font.display(), "Loaded label font");
        }

        info!(
            width = config.width,
            height = config.height,
            decode_timeout_secs = config.decode_timeout.as_secs(),
            extent = ?config.extent,
            "Render surface ready"
        );
        let map = MapConfig {
            extent: config.extent,
            ..MapConfig::default()
        };
        Ok(Self::with_map(catalog, source, surface, map))
    }
}

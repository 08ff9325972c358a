//! Common types shared across the forecast viewer crates.

pub mod bbox;
pub mod catalog;
pub mod error;
pub mod grid;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use catalog::{build_catalog, build_catalog_lenient, ForecastCatalog, ForecastFrame, LenientCatalog};
pub use error::{CatalogError, CatalogResult, GridError, GridResult};
pub use grid::{kelvin_to_celsius, GridDataSource, GridSample, LevelSelector, KELVIN_OFFSET};
pub use time::ValidTime;

//! Forecast frame catalog built from a directory listing.
//!
//! Filenames follow `<prefix>_<YYYYMMDD>_f<HHH><suffix>.<ext>`, e.g.
//! `gfs_20240601_f024.grib2`. The catalog performs no filesystem access;
//! callers hand it an already-filtered listing.
//!
//! Frames are ordered by their parsed valid time, not by listing order, so a
//! listing that sorts `f100` before `f012` still yields chronological frames.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::time::ValidTime;

/// One forecast file and the time it is valid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastFrame {
    /// Path to the forecast file, exactly as given in the listing
    pub source_path: PathBuf,
    /// Base date and forecast hour parsed from the filename
    pub valid_time: ValidTime,
}

impl ForecastFrame {
    /// Parse a frame descriptor from a path whose final component is a
    /// forecast filename.
    pub fn from_path(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        let source_path = path.into();
        let file_name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CatalogError::malformed(&source_path.to_string_lossy(), "no UTF-8 file name")
            })?;

        let valid_time = parse_forecast_filename(file_name)?;
        Ok(Self {
            source_path,
            valid_time,
        })
    }

    pub fn base_date(&self) -> NaiveDate {
        self.valid_time.base_date
    }

    pub fn forecast_hour(&self) -> u32 {
        self.valid_time.forecast_hour
    }

    /// Base date + forecast hour.
    pub fn forecast_time(&self) -> DateTime<Utc> {
        self.valid_time.valid_datetime()
    }

    /// File name component of the source path.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Parse the base date and forecast hour out of a forecast filename.
///
/// Field 1 (after splitting on `_`) must be an 8-digit `YYYYMMDD` date and
/// characters 1..4 of field 2 must be the 3-digit forecast hour.
pub fn parse_forecast_filename(file_name: &str) -> CatalogResult<ValidTime> {
    let fields: Vec<&str> = file_name.split('_').collect();
    if fields.len() < 3 {
        return Err(CatalogError::malformed(
            file_name,
            format!("expected at least 3 '_'-separated fields, found {}", fields.len()),
        ));
    }

    let date_str = fields[1];
    if date_str.len() != 8 || !date_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CatalogError::malformed(
            file_name,
            format!("base date '{}' is not YYYYMMDD", date_str),
        ));
    }
    let base_date = NaiveDate::parse_from_str(date_str, "%Y%m%d").map_err(|e| {
        CatalogError::malformed(file_name, format!("invalid base date '{}': {}", date_str, e))
    })?;

    let hour_str = fields[2].get(1..4).ok_or_else(|| {
        CatalogError::malformed(
            file_name,
            format!("forecast hour field '{}' is too short", fields[2]),
        )
    })?;
    if !hour_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CatalogError::malformed(
            file_name,
            format!("forecast hour '{}' is not 3 digits", hour_str),
        ));
    }
    let forecast_hour: u32 = hour_str.parse().map_err(|_| {
        CatalogError::malformed(file_name, format!("invalid forecast hour '{}'", hour_str))
    })?;

    Ok(ValidTime::new(base_date, forecast_hour))
}

/// Ordered, index-addressable sequence of forecast frames. Never empty.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastCatalog {
    frames: Vec<ForecastFrame>,
}

impl ForecastCatalog {
    fn from_frames(mut frames: Vec<ForecastFrame>) -> CatalogResult<Self> {
        if frames.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        // Stable: equal valid times keep path order.
        frames.sort_by(|a, b| {
            a.forecast_time()
                .cmp(&b.forecast_time())
                .then_with(|| a.source_path.cmp(&b.source_path))
        });
        debug!(frames = frames.len(), "Built forecast catalog");
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ForecastFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[ForecastFrame] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastFrame> {
        self.frames.iter()
    }

    /// Index of the last frame.
    pub fn last_index(&self) -> usize {
        self.frames.len() - 1
    }
}

/// Build a catalog, failing on the first malformed filename.
pub fn build_catalog<I, P>(listing: I) -> CatalogResult<ForecastCatalog>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let frames = listing
        .into_iter()
        .map(|p| ForecastFrame::from_path(p.as_ref()))
        .collect::<CatalogResult<Vec<_>>>()?;
    ForecastCatalog::from_frames(frames)
}

/// Catalog built with malformed filenames skipped.
#[derive(Debug, Clone)]
pub struct LenientCatalog {
    pub catalog: ForecastCatalog,
    pub rejected: Vec<CatalogError>,
}

/// Build a catalog, skipping malformed filenames with a warning.
///
/// Fails only when no filename parses.
pub fn build_catalog_lenient<I, P>(listing: I) -> CatalogResult<LenientCatalog>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut frames = Vec::new();
    let mut rejected = Vec::new();

    for path in listing {
        match ForecastFrame::from_path(path.as_ref()) {
            Ok(frame) => frames.push(frame),
            Err(e) => {
                warn!(error = %e, "Skipping forecast file");
                rejected.push(e);
            }
        }
    }

    Ok(LenientCatalog {
        catalog: ForecastCatalog::from_frames(frames)?,
        rejected,
    })
}

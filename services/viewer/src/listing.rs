//! Directory listing for forecast files.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use forecast_common::{build_catalog, build_catalog_lenient, ForecastCatalog};

use crate::config::MalformedPolicy;
use crate::error::ViewerError;

/// Regular files directly inside `dir` whose name ends with `extension`,
/// sorted by file name. Subdirectories are not searched.
pub fn list_forecast_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ViewerError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ViewerError::Listing {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(extension));
        if matches {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// List `dir` and build the frame catalog under `policy`.
pub fn load_catalog(
    dir: &Path,
    extension: &str,
    policy: MalformedPolicy,
) -> Result<ForecastCatalog, ViewerError> {
    let files = list_forecast_files(dir, extension)?;
    info!(dir = %dir.display(), files = files.len(), "Listed forecast files");

    let catalog = match policy {
        MalformedPolicy::Abort => build_catalog(&files)?,
        MalformedPolicy::Skip => {
            let lenient = build_catalog_lenient(&files)?;
            if !lenient.rejected.is_empty() {
                warn!(skipped = lenient.rejected.len(), "Skipped malformed forecast files");
            }
            lenient.catalog
        }
    };

    info!(
        frames = catalog.len(),
        first = %catalog.frames()[0].forecast_time(),
        last = %catalog.frames()[catalog.last_index()].forecast_time(),
        "Forecast catalog ready"
    );
    Ok(catalog)
}

//! Tests for forecast file listing and catalog loading.

use std::fs;
use std::path::Path;

use forecast_common::CatalogError;
use viewer::config::MalformedPolicy;
use viewer::error::ViewerError;
use viewer::listing::{list_forecast_files, load_catalog};

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").unwrap();
}

#[test]
fn test_lists_matching_files_sorted_by_name() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "gfs_20240601_f012.grib2");
    touch(dir.path(), "gfs_20240601_f000.grib2");
    touch(dir.path(), "gfs_20240601_f006.grib2");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "gfs_20240601_f018.GRIB2");
    fs::create_dir(dir.path().join("archive.grib2")).unwrap();

    let files = list_forecast_files(dir.path(), ".grib2").unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "gfs_20240601_f000.grib2",
            "gfs_20240601_f006.grib2",
            "gfs_20240601_f012.grib2",
        ]
    );
    assert!(files.iter().all(|p| p.starts_with(dir.path())));
}

#[test]
fn test_subdirectories_not_searched() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    touch(&dir.path().join("nested"), "gfs_20240601_f000.grib2");

    assert!(list_forecast_files(dir.path(), ".grib2").unwrap().is_empty());
}

#[test]
fn test_missing_directory_is_listing_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(
        list_forecast_files(&missing, ".grib2"),
        Err(ViewerError::Listing { .. })
    ));
}

#[test]
fn test_empty_directory_is_empty_catalog() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_catalog(dir.path(), ".grib2", MalformedPolicy::Abort),
        Err(ViewerError::Catalog(CatalogError::EmptyCatalog))
    ));
}

#[test]
fn test_malformed_name_aborts_by_default() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "gfs_20240601_f000.grib2");
    touch(dir.path(), "latest.grib2");

    assert!(matches!(
        load_catalog(dir.path(), ".grib2", MalformedPolicy::Abort),
        Err(ViewerError::Catalog(CatalogError::MalformedFilename { .. }))
    ));
}

#[test]
fn test_malformed_name_skipped_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "gfs_20240601_f006.grib2");
    touch(dir.path(), "gfs_20240601_f000.grib2");
    touch(dir.path(), "latest.grib2");

    let catalog = load_catalog(dir.path(), ".grib2", MalformedPolicy::Skip).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(0).unwrap().forecast_hour(), 0);
    assert_eq!(catalog.get(1).unwrap().forecast_hour(), 6);
}

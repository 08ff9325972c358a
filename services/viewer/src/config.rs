//! Viewer configuration.
//!
//! Values come from, highest precedence first: command line flags, `VIEWER_*`
//! environment variables (a `.env` file is loaded at startup), an optional
//! YAML file, and built-in defaults.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use forecast_common::BoundingBox;
use renderer::default_extent;

use crate::error::ViewerError;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8090";
pub const DEFAULT_EXTENSION: &str = ".grib2";
pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 800;
pub const DEFAULT_DECODE_TIMEOUT_SECS: u64 = 30;

/// What to do with a listed file whose name does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Refuse to start
    #[default]
    Abort,
    /// Log a warning and leave the file out
    Skip,
}

#[derive(Parser, Debug, Default)]
#[command(name = "viewer")]
#[command(about = "850 hPa temperature forecast viewer")]
pub struct Args {
    /// YAML config file
    #[arg(short, long, env = "VIEWER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the forecast files
    #[arg(long, env = "VIEWER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// File name suffix of forecast files (case-sensitive)
    #[arg(long, env = "VIEWER_EXTENSION")]
    pub extension: Option<String>,

    /// Handling of unparseable file names
    #[arg(long, env = "VIEWER_MALFORMED", value_enum)]
    pub malformed: Option<MalformedPolicy>,

    /// Listen address
    #[arg(short, long, env = "VIEWER_LISTEN")]
    pub listen: Option<String>,

    /// Canvas width in pixels
    #[arg(long, env = "VIEWER_WIDTH")]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, env = "VIEWER_HEIGHT")]
    pub height: Option<u32>,

    /// TrueType font for title and labels
    #[arg(long, env = "VIEWER_FONT")]
    pub font: Option<PathBuf>,

    /// Seconds before a frame decode is abandoned
    #[arg(long, env = "VIEWER_DECODE_TIMEOUT_SECS")]
    pub decode_timeout_secs: Option<u64>,

    /// Map extent as "minlon,minlat,maxlon,maxlat"
    #[arg(long, env = "VIEWER_EXTENT", allow_hyphen_values = true)]
    pub extent: Option<String>,

    /// Log level
    #[arg(long, env = "VIEWER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Contents of the optional YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub malformed: Option<MalformedPolicy>,
    pub listen: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font: Option<PathBuf>,
    pub decode_timeout_secs: Option<u64>,
    pub extent: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let contents = fs::read_to_string(path).map_err(|source| ViewerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ViewerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    pub extension: String,
    pub malformed: MalformedPolicy,
    pub listen: String,
    pub width: u32,
    pub height: u32,
    pub font: Option<PathBuf>,
    pub decode_timeout: Duration,
    pub extent: BoundingBox,
    pub log_level: String,
}

impl ViewerConfig {
    /// Read the config file named by `args` (if any) and merge.
    pub fn load(args: &Args) -> Result<Self, ViewerError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    /// Merge CLI/env values over file values over defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ViewerError> {
        let data_dir = args
            .data_dir
            .clone()
            .or(file.data_dir)
            .ok_or(ViewerError::MissingDataDir)?;

        let extension = args
            .extension
            .clone()
            .or(file.extension)
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        if extension.is_empty() {
            return Err(ViewerError::InvalidConfig {
                key: "extension",
                message: "must not be empty".to_string(),
            });
        }

        let width = args.width.or(file.width).unwrap_or(DEFAULT_WIDTH);
        let height = args.height.or(file.height).unwrap_or(DEFAULT_HEIGHT);
        if width < 200 || height < 150 {
            return Err(ViewerError::InvalidConfig {
                key: "width/height",
                message: format!("canvas {}x{} is too small (minimum 200x150)", width, height),
            });
        }

        let timeout_secs = args
            .decode_timeout_secs
            .or(file.decode_timeout_secs)
            .unwrap_or(DEFAULT_DECODE_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ViewerError::InvalidConfig {
                key: "decode_timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }

        let extent = match args.extent.as_deref().or(file.extent.as_deref()) {
            Some(spec) => BoundingBox::parse(spec)?,
            None => default_extent(),
        };
        if extent.min_lat < -90.0 || extent.max_lat > 90.0 {
            return Err(ViewerError::InvalidConfig {
                key: "extent",
                message: format!(
                    "latitudes {}..{} fall outside -90..90",
                    extent.min_lat, extent.max_lat
                ),
            });
        }

        Ok(Self {
            data_dir,
            extension,
            malformed: args.malformed.or(file.malformed).unwrap_or_default(),
            listen: args
                .listen
                .clone()
                .or(file.listen)
                .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
            width,
            height,
            font: args.font.clone().or(file.font),
            decode_timeout: Duration::from_secs(timeout_secs),
            extent,
            log_level: args.log_level.clone(),
        })
    }
}

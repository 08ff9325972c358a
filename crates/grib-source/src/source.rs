//! GRIB2 implementation of [`GridDataSource`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use forecast_common::{GridDataSource, GridError, GridResult, GridSample, LevelSelector};

/// GRIB2 Code Table 4.5: isobaric surface, value in Pa.
const SURFACE_ISOBARIC: u8 = 100;

/// Pascals per hectopascal.
const PA_PER_HPA: f64 = 100.0;

/// Identifies a parameter by GRIB2 discipline, category and number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterKey {
    pub discipline: u8,
    pub category: u8,
    pub number: u8,
}

impl ParameterKey {
    /// Air temperature (TMP), Kelvin.
    pub const TEMPERATURE: ParameterKey = ParameterKey {
        discipline: 0,
        category: 0,
        number: 0,
    };
}

/// Reads grid samples from GRIB2 files.
#[derive(Debug, Clone)]
pub struct GribGridSource {
    parameter: ParameterKey,
}

impl GribGridSource {
    pub fn new(parameter: ParameterKey) -> Self {
        Self { parameter }
    }

    /// Source for air temperature.
    pub fn temperature() -> Self {
        Self::new(ParameterKey::TEMPERATURE)
    }

    pub fn parameter(&self) -> ParameterKey {
        self.parameter
    }
}

impl Default for GribGridSource {
    fn default() -> Self {
        Self::temperature()
    }
}

/// GRIB2 surface type and value (in the surface's native unit) for a level.
pub fn surface_for_level(level: &LevelSelector) -> Option<(u8, f64)> {
    match level.level_type.as_str() {
        "isobaricInhPa" => Some((SURFACE_ISOBARIC, f64::from(level.level) * PA_PER_HPA)),
        _ => None,
    }
}

impl GridDataSource for GribGridSource {
    fn load(&self, path: &Path, level: &LevelSelector) -> GridResult<GridSample> {
        let decode_err = |message: String| GridError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let (surface_type, surface_value) = surface_for_level(level)
            .ok_or_else(|| decode_err(format!("unsupported level type '{}'", level.level_type)))?;

        let file = File::open(path).map_err(|source| GridError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grib2 = grib::from_reader(BufReader::new(file))
            .map_err(|e| decode_err(format!("parse failed: {}", e)))?;

        for (index, submessage) in grib2.iter() {
            if submessage.indicator().discipline != self.parameter.discipline {
                continue;
            }
            let prod_def = submessage.prod_def();
            if prod_def.parameter_category() != Some(self.parameter.category)
                || prod_def.parameter_number() != Some(self.parameter.number)
            {
                continue;
            }
            let on_level = prod_def
                .fixed_surfaces()
                .map(|(first, _)| {
                    first.surface_type == surface_type
                        && (first.value() - surface_value).abs() < 1e-3
                })
                .unwrap_or(false);
            if !on_level {
                continue;
            }

            debug!(?index, path = %path.display(), "Matched GRIB2 submessage");

            let (ni, nj) = submessage
                .grid_shape()
                .map_err(|e| decode_err(format!("grid shape: {}", e)))?;
            let points = submessage
                .latlons()
                .map_err(|e| decode_err(format!("grid coordinates: {}", e)))?;
            let (lons, lats) = axes_from_points(points, ni, nj)?;

            let decoder = grib::Grib2SubmessageDecoder::from(submessage)
                .map_err(|e| decode_err(format!("decoder: {}", e)))?;
            let values: Vec<f32> = decoder
                .dispatch()
                .map_err(|e| decode_err(format!("unpack: {}", e)))?
                .collect();

            info!(
                path = %path.display(),
                width = ni,
                height = nj,
                level = level.level,
                "Decoded GRIB2 field"
            );
            return GridSample::new(values, lons, lats);
        }

        Err(GridError::LevelNotFound {
            path: path.to_path_buf(),
            level_type: level.level_type.clone(),
            level: level.level,
        })
    }
}

/// Split the scan-ordered (lat, lon) points of a regular grid into its
/// longitude axis (first row) and latitude axis (first column).
pub fn axes_from_points<I>(points: I, ni: usize, nj: usize) -> GridResult<(Vec<f64>, Vec<f64>)>
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let mut lons = Vec::with_capacity(ni);
    let mut lats = Vec::with_capacity(nj);
    let mut count = 0usize;

    for (idx, (lat, lon)) in points.into_iter().enumerate() {
        if idx < ni {
            lons.push(f64::from(lon));
        }
        if ni > 0 && idx % ni == 0 {
            lats.push(f64::from(lat));
        }
        count += 1;
    }

    if ni == 0 || nj == 0 || count != ni * nj || lats.len() != nj {
        return Err(GridError::ShapeMismatch {
            values: count,
            rows: nj,
            cols: ni,
        });
    }

    Ok((lons, lats))
}

//! Time handling for forecast frames.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Display format for forecast timestamps in titles and listings.
pub const TITLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Valid time of a forecast frame.
///
/// Combines the model base date (run at 00 UTC) and the forecast hour offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    /// Model base date
    pub base_date: NaiveDate,
    /// Forecast hour offset from the base date
    pub forecast_hour: u32,
}

impl ValidTime {
    pub fn new(base_date: NaiveDate, forecast_hour: u32) -> Self {
        Self {
            base_date,
            forecast_hour,
        }
    }

    /// Base date at 00:00 UTC.
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.base_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Calculate the actual valid time (base date + forecast offset)
    pub fn valid_datetime(&self) -> DateTime<Utc> {
        self.reference_time() + Duration::hours(i64::from(self.forecast_hour))
    }

    /// Valid time formatted as `YYYY-MM-DD HH:MM UTC`.
    pub fn display(&self) -> String {
        self.valid_datetime().format(TITLE_TIME_FORMAT).to_string()
    }
}

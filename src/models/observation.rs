use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::EVENT_TIME_FORMAT;

/// One row of station telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ObservationRecord {
    pub station_id: String,

    pub event_time: DateTime<Utc>,

    // Unit is ambiguous until normalized
    pub outdoor_temperature: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub outdoor_humidity: Option<f64>,

    pub dew_point: Option<f64>,
}

impl ObservationRecord {
    pub fn new(
        station_id: impl Into<String>,
        event_time: DateTime<Utc>,
        outdoor_temperature: Option<f64>,
        outdoor_humidity: Option<f64>,
        dew_point: Option<f64>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            event_time,
            outdoor_temperature,
            outdoor_humidity,
            dew_point,
        }
    }

    /// Parse an `event_time` cell (`YYYY-MM-DD HH:MM:SS UTC`) as a UTC instant
    pub fn parse_event_time(value: &str) -> Result<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(value.trim(), EVENT_TIME_FORMAT).map_err(|_| {
            ProcessingError::InvalidFormat(format!("Invalid event_time: '{}'", value))
        })?;
        Ok(naive.and_utc())
    }

    pub fn has_valid_humidity(&self) -> bool {
        self.validate().is_ok()
    }
}

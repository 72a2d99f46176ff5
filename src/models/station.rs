use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-station overview of a loaded table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station_id: String,
    pub sample_count: usize,
    pub first_observation: DateTime<Utc>,
    pub last_observation: DateTime<Utc>,
}

impl StationSummary {
    pub fn first_day(&self) -> NaiveDate {
        self.first_observation.date_naive()
    }

    pub fn summary(&self) -> String {
        format!(
            "Station {}: {} samples, {} to {}",
            self.station_id,
            self.sample_count,
            self.first_observation.format("%Y-%m-%d %H:%M:%S"),
            self.last_observation.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

/// Known facts about a named station, used to find its id in anonymous data
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationReference {
    #[validate(length(min = 1))]
    pub name: Option<String>,

    #[validate(range(min = 1))]
    pub sample_count: Option<usize>,

    pub first_day: NaiveDate,
}

impl StationReference {
    pub fn new(first_day: NaiveDate) -> Self {
        Self {
            name: None,
            sample_count: None,
            first_day,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = Some(sample_count);
        self
    }

    pub fn matches(&self, station: &StationSummary) -> bool {
        station.first_day() == self.first_day
            && self
                .sample_count
                .map_or(true, |count| count == station.sample_count)
    }
}

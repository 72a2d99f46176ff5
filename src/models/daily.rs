use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mean, min and max of one metric over one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl MetricSummary {
    /// Summarize finite values; `None` when there are none
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut count = 0usize;

        for value in values.into_iter().filter(|v| v.is_finite()) {
            sum += value;
            min = min.min(value);
            max = max.max(value);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            mean: sum / count as f64,
            min,
            max,
            count,
        })
    }
}

/// Daily reduction of a station's observations (UTC calendar day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub observations: usize,
    pub wet_bulb: Option<MetricSummary>,
    pub temperature: Option<MetricSummary>,
    pub humidity: Option<MetricSummary>,
}

impl DailyAggregate {
    pub fn metric(&self, metric: DailyMetric) -> Option<&MetricSummary> {
        match metric {
            DailyMetric::WetBulb => self.wet_bulb.as_ref(),
            DailyMetric::Temperature => self.temperature.as_ref(),
            DailyMetric::Humidity => self.humidity.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMetric {
    WetBulb,
    Temperature,
    Humidity,
}

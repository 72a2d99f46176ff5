use crate::error::Result;
use crate::models::{DailyAggregate, MetricSummary, ObservationTable};
use crate::utils::constants::{HUMIDITY_COLUMN, TEMPERATURE_COLUMN, WET_BULB_COLUMN};
use arrow::array::{Array, Float64Array};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Default)]
struct DayValues {
    observations: usize,
    wet_bulb: Vec<f64>,
    temperature: Vec<f64>,
    humidity: Vec<f64>,
}

/// Reduces a station's observations to per-day mean/min/max (UTC days)
pub struct DailyAggregator;

impl DailyAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate one station's table. Metric columns that are absent yield
    /// `None` summaries rather than an error.
    pub fn aggregate(&self, table: &ObservationTable) -> Result<Vec<DailyAggregate>> {
        let times = table.event_times()?;
        let wet_bulb = optional_column(table, WET_BULB_COLUMN)?;
        let temperature = optional_column(table, TEMPERATURE_COLUMN)?;
        let humidity = optional_column(table, HUMIDITY_COLUMN)?;

        let mut days: BTreeMap<NaiveDate, DayValues> = BTreeMap::new();

        for (row, time) in times.iter().enumerate() {
            let day = days.entry(time.date_naive()).or_default();
            day.observations += 1;

            push_value(&mut day.wet_bulb, wet_bulb, row);
            push_value(&mut day.temperature, temperature, row);
            push_value(&mut day.humidity, humidity, row);
        }

        Ok(days
            .into_iter()
            .map(|(date, values)| DailyAggregate {
                date,
                observations: values.observations,
                wet_bulb: MetricSummary::from_values(values.wet_bulb),
                temperature: MetricSummary::from_values(values.temperature),
                humidity: MetricSummary::from_values(values.humidity),
            })
            .collect())
    }
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn optional_column<'a>(table: &'a ObservationTable, name: &str) -> Result<Option<&'a Float64Array>> {
    if table.has_column(name) {
        Ok(Some(table.float_column(name)?))
    } else {
        Ok(None)
    }
}

fn push_value(values: &mut Vec<f64>, column: Option<&Float64Array>, row: usize) {
    if let Some(column) = column {
        if column.is_valid(row) {
            values.push(column.value(row));
        }
    }
}

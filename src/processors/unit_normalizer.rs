use crate::error::Result;
use crate::models::ObservationTable;
use crate::utils::constants::DEFAULT_FAHRENHEIT_THRESHOLD;
use arrow::array::{Array, Float64Array};
use arrow::datatypes::Float64Type;
use std::sync::Arc;
use tracing::{debug, info};

/// Rewrites Fahrenheit readings mixed into a Celsius column.
///
/// Any value strictly above the threshold is taken to be Fahrenheit. Readings
/// below the threshold in Fahrenheit (under ~10 °C) cannot be told apart and
/// are left as they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitNormalizer {
    threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizationReport {
    pub total_values: usize,
    pub converted_values: usize,
}

impl UnitNormalizer {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_FAHRENHEIT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_fahrenheit(&self, value: f64) -> bool {
        value > self.threshold
    }

    pub fn normalize_value(&self, value: f64) -> f64 {
        if self.is_fahrenheit(value) {
            fahrenheit_to_celsius(value)
        } else {
            value
        }
    }

    /// Elementwise normalization; nulls stay null
    pub fn normalize(&self, temperature: &Float64Array) -> Float64Array {
        temperature.unary::<_, Float64Type>(|v| self.normalize_value(v))
    }

    pub fn count_fahrenheit(&self, temperature: &Float64Array) -> usize {
        temperature
            .iter()
            .flatten()
            .filter(|v| self.is_fahrenheit(*v))
            .count()
    }

    /// Normalize a table column in place
    pub fn normalize_column(
        &self,
        table: &mut ObservationTable,
        column: &str,
    ) -> Result<NormalizationReport> {
        let (normalized, report) = {
            let temperature = table.float_column(column)?;
            let report = NormalizationReport {
                total_values: temperature.len() - temperature.null_count(),
                converted_values: self.count_fahrenheit(temperature),
            };
            (self.normalize(temperature), report)
        };

        table.replace_column(column, Arc::new(normalized))?;

        if report.converted_values > 0 {
            info!(
                column,
                converted = report.converted_values,
                threshold = self.threshold,
                "Converted Fahrenheit readings to Celsius"
            );
        } else {
            debug!(column, "No Fahrenheit readings found");
        }

        Ok(report)
    }
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

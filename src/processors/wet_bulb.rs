//! Stull (2011) wet-bulb temperature estimate.
//!
//! Stull, R. (2011). "Wet-Bulb Temperature from Relative Humidity and Air
//! Temperature". J. Appl. Meteor. Climatol., 50, 2267-2269.

use crate::error::{ProcessingError, Result};
use arrow::array::{Array, Float64Array};
use serde::{Deserialize, Serialize};

/// Empirical constants of the Stull fit.
///
/// `Tw = T·atan(a·√(H + b)) + atan(T + H) − atan(H − c) + d·H^1.5·atan(e·H) − f`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StullCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for StullCoefficients {
    fn default() -> Self {
        Self {
            a: 0.151977,
            b: 8.313659,
            c: 1.676331,
            d: 0.00391838,
            e: 0.023101,
            f: 4.686035,
        }
    }
}

/// Elementwise wet-bulb estimator over Float64 arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct WetBulbEstimator {
    coefficients: StullCoefficients,
}

impl WetBulbEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coefficients(coefficients: StullCoefficients) -> Self {
        Self { coefficients }
    }

    /// Wet-bulb temperature (°C) from air temperature (°C) and relative humidity (%).
    ///
    /// Humidity below `-b` takes the square root of a negative number and
    /// yields NaN.
    pub fn estimate_value(&self, temperature: f64, humidity: f64) -> f64 {
        let k = &self.coefficients;
        temperature * (k.a * (humidity + k.b).sqrt()).atan() + (temperature + humidity).atan()
            - (humidity - k.c).atan()
            + k.d * humidity.powf(1.5) * (k.e * humidity).atan()
            - k.f
    }

    /// Elementwise estimate; a null in either input gives a null output
    pub fn estimate(
        &self,
        temperature: &Float64Array,
        humidity: &Float64Array,
    ) -> Result<Float64Array> {
        check_shape("outdoor_humidity", temperature.len(), humidity.len())?;

        Ok(temperature
            .iter()
            .zip(humidity.iter())
            .map(|pair| match pair {
                (Some(t), Some(h)) => Some(self.estimate_value(t, h)),
                _ => None,
            })
            .collect())
    }

    /// Dew-point-aware signature. The dew point is shape-checked but does not
    /// enter the formula.
    pub fn estimate_with_dew_point(
        &self,
        temperature: &Float64Array,
        humidity: &Float64Array,
        dew_point: &Float64Array,
    ) -> Result<Float64Array> {
        check_shape("dew_point", temperature.len(), dew_point.len())?;
        self.estimate(temperature, humidity)
    }

    /// Entry point for arrays of unknown kind, e.g. straight out of a record
    /// batch. Anything that is not a Float64 array is rejected before
    /// computing.
    pub fn estimate_dyn(
        &self,
        temperature: &dyn Array,
        humidity: &dyn Array,
        dew_point: Option<&dyn Array>,
    ) -> Result<Float64Array> {
        let temperature = as_float64("outdoor_temperature", temperature)?;
        let humidity = as_float64("outdoor_humidity", humidity)?;

        match dew_point {
            Some(dew_point) => {
                let dew_point = as_float64("dew_point", dew_point)?;
                self.estimate_with_dew_point(temperature, humidity, dew_point)
            }
            None => self.estimate(temperature, humidity),
        }
    }
}

fn as_float64<'a>(argument: &str, array: &'a dyn Array) -> Result<&'a Float64Array> {
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ProcessingError::InvalidInputType {
            argument: argument.to_string(),
            expected: "Float64 array".to_string(),
            found: array.data_type().to_string(),
        })
}

fn check_shape(argument: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ProcessingError::ShapeMismatch {
            argument: argument.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float32Array, Int64Array, StringArray};

    // Closed-form Stull value for T = 25 °C, H = 50 %
    const TW_25C_50PCT: f64 = 17.99814746834343;

    #[test]
    fn test_reference_value() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![25.0]);
        let h = Float64Array::from(vec![50.0]);

        let tw = estimator.estimate(&t, &h).unwrap();
        assert_eq!(tw.len(), 1);
        assert!((tw.value(0) - TW_25C_50PCT).abs() < 1e-9);
    }

    #[test]
    fn test_more_reference_values() {
        let estimator = WetBulbEstimator::new();
        assert!((estimator.estimate_value(30.0, 80.0) - 27.12969171058859).abs() < 1e-9);
        assert!((estimator.estimate_value(20.0, 100.0) - 20.010196016878677).abs() < 1e-9);
        assert!((estimator.estimate_value(35.0, 10.0) - 15.621860114405234).abs() < 1e-9);
    }

    #[test]
    fn test_output_shape_matches_input() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![10.0, 20.0, 30.0, 40.0]);
        let h = Float64Array::from(vec![90.0, 70.0, 50.0, 30.0]);

        let tw = estimator.estimate(&t, &h).unwrap();
        assert_eq!(tw.len(), t.len());

        let empty = Float64Array::from(Vec::<f64>::new());
        assert_eq!(estimator.estimate(&empty, &empty).unwrap().len(), 0);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![-5.0, 12.3, 28.9, 41.0]);
        let h = Float64Array::from(vec![5.0, 47.2, 83.1, 99.9]);

        let first = estimator.estimate(&t, &h).unwrap();
        let second = estimator.estimate(&t, &h).unwrap();
        for i in 0..first.len() {
            assert_eq!(first.value(i).to_bits(), second.value(i).to_bits());
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![1.0, 2.0, 3.0]);
        let h = Float64Array::from(vec![1.0, 2.0, 3.0, 4.0]);

        let err = estimator.estimate(&t, &h).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::ShapeMismatch {
                expected: 3,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_dew_point_shape_mismatch() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![1.0, 2.0, 3.0]);
        let h = Float64Array::from(vec![1.0, 2.0, 3.0]);
        let dp = Float64Array::from(vec![1.0, 2.0]);

        let err = estimator.estimate_with_dew_point(&t, &h, &dp).unwrap_err();
        assert!(matches!(err, ProcessingError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_dew_point_does_not_change_result() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![25.0, 31.0]);
        let h = Float64Array::from(vec![50.0, 75.0]);
        let dp = Float64Array::from(vec![-40.0, 99.0]);

        let with_dp = estimator.estimate_with_dew_point(&t, &h, &dp).unwrap();
        let without = estimator.estimate(&t, &h).unwrap();
        assert_eq!(with_dp, without);
    }

    #[test]
    fn test_invalid_input_type() {
        let estimator = WetBulbEstimator::new();
        let as_text = StringArray::from(vec!["25.0"]);
        let as_int = Int64Array::from(vec![25]);
        let as_f32 = Float32Array::from(vec![25.0]);
        let h = Float64Array::from(vec![50.0]);

        let inputs: [&dyn Array; 3] = [&as_text, &as_int, &as_f32];
        for t in inputs {
            let err = estimator.estimate_dyn(t, &h, None).unwrap_err();
            assert!(matches!(err, ProcessingError::InvalidInputType { .. }));
        }

        let t = Float64Array::from(vec![25.0]);
        let err = estimator.estimate_dyn(&t, &h, Some(&as_int)).unwrap_err();
        match err {
            ProcessingError::InvalidInputType { argument, .. } => assert_eq!(argument, "dew_point"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_type_is_checked_before_shape() {
        let estimator = WetBulbEstimator::new();
        let t = Int64Array::from(vec![1, 2, 3]);
        let h = Float64Array::from(vec![1.0, 2.0, 3.0, 4.0]);

        let err = estimator.estimate_dyn(&t, &h, None).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInputType { .. }));
    }

    #[test]
    fn test_negative_humidity_offset_yields_nan() {
        // H + b < 0 takes the square root of a negative number
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![20.0, 20.0]);
        let h = Float64Array::from(vec![-10.0, 50.0]);

        let tw = estimator.estimate(&t, &h).unwrap();
        assert!(tw.value(0).is_nan());
        assert!(tw.value(1).is_finite());
        assert!(!tw.is_null(0));
    }

    #[test]
    fn test_nulls_propagate() {
        let estimator = WetBulbEstimator::new();
        let t = Float64Array::from(vec![Some(25.0), None, Some(25.0)]);
        let h = Float64Array::from(vec![Some(50.0), Some(50.0), None]);

        let tw = estimator.estimate(&t, &h).unwrap();
        assert!(tw.is_valid(0));
        assert!(tw.is_null(1));
        assert!(tw.is_null(2));
    }

    #[test]
    fn test_custom_coefficients() {
        let coefficients = StullCoefficients {
            f: 0.0,
            ..StullCoefficients::default()
        };
        let shifted = WetBulbEstimator::with_coefficients(coefficients);
        let standard = WetBulbEstimator::new();

        let delta = shifted.estimate_value(25.0, 50.0) - standard.estimate_value(25.0, 50.0);
        assert!((delta - 4.686035).abs() < 1e-12);
    }
}

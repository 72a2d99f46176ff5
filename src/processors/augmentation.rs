use crate::error::Result;
use crate::models::ObservationTable;
use crate::processors::{NormalizationReport, UnitNormalizer, WetBulbEstimator};
use crate::utils::constants::{
    DEW_POINT_COLUMN, HUMIDITY_COLUMN, TEMPERATURE_COLUMN, WET_BULB_COLUMN,
};
use arrow::array::Array;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Adds the `wet_bulb` column to an observation table.
///
/// Two input variants exist: one requires a `dew_point` column (passed to the
/// estimator but not used by the formula), the other normalizes mixed
/// Fahrenheit/Celsius temperatures first. Both can be combined.
#[derive(Debug, Clone, Default)]
pub struct WetBulbAugmenter {
    estimator: WetBulbEstimator,
    normalizer: Option<UnitNormalizer>,
    require_dew_point: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentationReport {
    pub rows: usize,
    pub normalization: Option<NormalizationReport>,
    pub nan_results: usize,
    pub null_results: usize,
}

impl AugmentationReport {
    pub fn summary(&self) -> String {
        let converted = self
            .normalization
            .map(|n| n.converted_values.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "Wet-bulb Augmentation:\n\
            - Rows: {}\n\
            - Fahrenheit readings converted: {}\n\
            - NaN results: {}\n\
            - Null results: {}",
            self.rows, converted, self.nan_results, self.null_results
        )
    }
}

impl WetBulbAugmenter {
    pub fn new(estimator: WetBulbEstimator) -> Self {
        Self {
            estimator,
            normalizer: None,
            require_dew_point: false,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Option<UnitNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_require_dew_point(mut self, require_dew_point: bool) -> Self {
        self.require_dew_point = require_dew_point;
        self
    }

    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![TEMPERATURE_COLUMN, HUMIDITY_COLUMN];
        if self.require_dew_point {
            columns.push(DEW_POINT_COLUMN);
        }
        columns
    }

    /// Validate, normalize, estimate and attach `wet_bulb`.
    ///
    /// Column presence and type are checked before anything is written, so a
    /// failing call leaves the table as it was.
    pub fn augment(&self, table: &mut ObservationTable) -> Result<AugmentationReport> {
        for column in self.required_columns() {
            table.float_column(column)?;
        }

        // A table that already carries wet_bulb has normalized temperatures
        let already_augmented = table.has_column(WET_BULB_COLUMN);
        let normalization = match &self.normalizer {
            Some(_) if already_augmented => {
                debug!("wet_bulb present, temperatures already normalized");
                None
            }
            Some(normalizer) => Some(normalizer.normalize_column(table, TEMPERATURE_COLUMN)?),
            None => None,
        };

        let wet_bulb = {
            let temperature = table.float_column(TEMPERATURE_COLUMN)?;
            let humidity = table.float_column(HUMIDITY_COLUMN)?;
            if self.require_dew_point {
                let dew_point = table.float_column(DEW_POINT_COLUMN)?;
                self.estimator
                    .estimate_with_dew_point(temperature, humidity, dew_point)?
            } else {
                self.estimator.estimate(temperature, humidity)?
            }
        };

        let report = AugmentationReport {
            rows: table.num_rows(),
            normalization,
            nan_results: wet_bulb.iter().flatten().filter(|v| v.is_nan()).count(),
            null_results: wet_bulb.null_count(),
        };

        table.set_column(WET_BULB_COLUMN, Arc::new(wet_bulb))?;

        if report.nan_results > 0 {
            warn!(
                count = report.nan_results,
                "Wet-bulb produced NaN (relative humidity below the formula's domain)"
            );
        }
        info!(rows = report.rows, "Computed wet-bulb temperature");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::models::{ColumnSet, ObservationRecord};
    use crate::utils::constants::{EVENT_TIME_COLUMN, STATION_ID_COLUMN};
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<ObservationRecord> {
        let t = Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap();
        vec![
            ObservationRecord::new("1", t, Some(77.0), Some(50.0), Some(14.0)),
            ObservationRecord::new("1", t, Some(25.0), Some(50.0), Some(14.0)),
            ObservationRecord::new("2", t, Some(20.0), Some(-20.0), None),
        ]
    }

    #[test]
    fn test_augment_appends_wet_bulb_last() {
        let mut table = ObservationTable::from_records(&records(), ColumnSet::all()).unwrap();
        let augmenter = WetBulbAugmenter::default().with_require_dew_point(true);

        let report = augmenter.augment(&mut table).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.normalization, None);
        assert_eq!(report.nan_results, 1);
        assert_eq!(table.column_names().last().unwrap(), WET_BULB_COLUMN);

        let wet_bulb = table.float_column(WET_BULB_COLUMN).unwrap();
        assert!((wet_bulb.value(1) - 17.99814746834343).abs() < 1e-9);
    }

    #[test]
    fn test_normalizer_runs_before_estimator() {
        let mut table =
            ObservationTable::from_records(&records(), ColumnSet::without_dew_point()).unwrap();
        let augmenter = WetBulbAugmenter::default().with_normalizer(Some(UnitNormalizer::new()));

        let report = augmenter.augment(&mut table).unwrap();
        assert_eq!(report.normalization.unwrap().converted_values, 1);

        // 77 °F is 25 °C, so both rows agree
        let wet_bulb = table.float_column(WET_BULB_COLUMN).unwrap();
        assert!((wet_bulb.value(0) - wet_bulb.value(1)).abs() < 1e-9);
    }

    #[test]
    fn test_missing_humidity_leaves_table_untouched() {
        let mut table = ObservationTable::from_records(
            &records(),
            ColumnSet {
                temperature: true,
                humidity: false,
                dew_point: false,
            },
        )
        .unwrap();
        let before = table.batch().clone();

        let augmenter = WetBulbAugmenter::default().with_normalizer(Some(UnitNormalizer::new()));
        let err = augmenter.augment(&mut table).unwrap_err();

        match err {
            ProcessingError::MissingColumn { column } => assert_eq!(column, HUMIDITY_COLUMN),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(table.batch(), &before);
        assert!(!table.has_column(WET_BULB_COLUMN));
    }

    #[test]
    fn test_dew_point_variant_requires_dew_point() {
        let mut table =
            ObservationTable::from_records(&records(), ColumnSet::without_dew_point()).unwrap();
        let augmenter = WetBulbAugmenter::default().with_require_dew_point(true);

        let err = augmenter.augment(&mut table).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn { .. }));
    }

    #[test]
    fn test_wrong_column_type_is_rejected() {
        use arrow::array::{ArrayRef, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;

        let base = ObservationTable::from_records(&records(), ColumnSet::all()).unwrap();
        let batch = base.batch();
        let humidity_as_text: ArrayRef = Arc::new(StringArray::from(vec!["50", "50", "-20"]));

        let schema = Schema::new(vec![
            Field::new(STATION_ID_COLUMN, DataType::Utf8, false),
            Field::new(
                EVENT_TIME_COLUMN,
                batch.column(1).data_type().clone(),
                false,
            ),
            Field::new(TEMPERATURE_COLUMN, DataType::Float64, true),
            Field::new(HUMIDITY_COLUMN, DataType::Utf8, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                batch.column(0).clone(),
                batch.column(1).clone(),
                batch.column(2).clone(),
                humidity_as_text,
            ],
        )
        .unwrap();
        let mut table = ObservationTable::new(batch).unwrap();

        let err = WetBulbAugmenter::default().augment(&mut table).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidInputType { .. }));
    }

    #[test]
    fn test_rerun_replaces_wet_bulb() {
        let mut table = ObservationTable::from_records(&records(), ColumnSet::all()).unwrap();
        let augmenter = WetBulbAugmenter::default();

        augmenter.augment(&mut table).unwrap();
        let width = table.column_names().len();
        augmenter.augment(&mut table).unwrap();
        assert_eq!(table.column_names().len(), width);
    }

    #[test]
    fn test_rerun_does_not_normalize_twice() {
        let t = Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap();
        let records = vec![ObservationRecord::new("1", t, Some(130.0), Some(50.0), None)];
        let mut table =
            ObservationTable::from_records(&records, ColumnSet::without_dew_point()).unwrap();
        let augmenter = WetBulbAugmenter::default().with_normalizer(Some(UnitNormalizer::new()));

        let first = augmenter.augment(&mut table).unwrap();
        assert_eq!(first.normalization.unwrap().converted_values, 1);
        let celsius = table.float_column(TEMPERATURE_COLUMN).unwrap().value(0);
        assert!((celsius - 54.44444444444444).abs() < 1e-9);
        let wet_bulb = table.float_column(WET_BULB_COLUMN).unwrap().value(0);

        let second = augmenter.augment(&mut table).unwrap();
        assert_eq!(second.normalization, None);
        assert_eq!(table.float_column(TEMPERATURE_COLUMN).unwrap().value(0), celsius);
        assert_eq!(table.float_column(WET_BULB_COLUMN).unwrap().value(0), wet_bulb);
    }
}

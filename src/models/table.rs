use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::filter_record_batch;
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ProcessingError, Result};
use crate::models::ObservationRecord;
use crate::utils::constants::{
    DEW_POINT_COLUMN, EVENT_TIME_COLUMN, HUMIDITY_COLUMN, STATION_ID_COLUMN, TEMPERATURE_COLUMN,
};

/// Which optional numeric columns a table is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet {
    pub temperature: bool,
    pub humidity: bool,
    pub dew_point: bool,
}

impl ColumnSet {
    pub fn all() -> Self {
        Self {
            temperature: true,
            humidity: true,
            dew_point: true,
        }
    }

    pub fn without_dew_point() -> Self {
        Self {
            temperature: true,
            humidity: true,
            dew_point: false,
        }
    }
}

/// Columnar, in-memory observation table.
///
/// Always carries `station_id` (Utf8) and `event_time` (millisecond UTC
/// timestamps). Numeric columns are Float64 and nullable.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    batch: RecordBatch,
}

impl ObservationTable {
    /// Wrap an existing batch, checking the key columns
    pub fn new(batch: RecordBatch) -> Result<Self> {
        let table = Self { batch };
        table.station_id_array()?;
        table.event_time_array()?;
        Ok(table)
    }

    pub fn from_records(records: &[ObservationRecord], columns: ColumnSet) -> Result<Self> {
        let station_ids =
            StringArray::from_iter_values(records.iter().map(|r| r.station_id.as_str()));
        let event_times = TimestampMillisecondArray::from(
            records
                .iter()
                .map(|r| r.event_time.timestamp_millis())
                .collect::<Vec<i64>>(),
        )
        .with_timezone("UTC");

        let mut fields = vec![
            Field::new(STATION_ID_COLUMN, DataType::Utf8, false),
            Field::new(EVENT_TIME_COLUMN, event_times.data_type().clone(), false),
        ];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(station_ids), Arc::new(event_times)];

        let mut push_numeric = |name: &str, values: Vec<Option<f64>>| {
            fields.push(Field::new(name, DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(values)));
        };

        if columns.temperature {
            push_numeric(
                TEMPERATURE_COLUMN,
                records.iter().map(|r| r.outdoor_temperature).collect(),
            );
        }
        if columns.humidity {
            push_numeric(
                HUMIDITY_COLUMN,
                records.iter().map(|r| r.outdoor_humidity).collect(),
            );
        }
        if columns.dew_point {
            push_numeric(DEW_POINT_COLUMN, records.iter().map(|r| r.dew_point).collect());
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| ProcessingError::missing_column(name))
    }

    /// Fetch a column as Float64, rejecting any other array kind
    pub fn float_column(&self, name: &str) -> Result<&Float64Array> {
        let column = self.column(name)?;
        column
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| ProcessingError::InvalidInputType {
                argument: name.to_string(),
                expected: "Float64 array".to_string(),
                found: column.data_type().to_string(),
            })
    }

    pub fn station_id_array(&self) -> Result<&StringArray> {
        let column = self.column(STATION_ID_COLUMN)?;
        column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| ProcessingError::InvalidInputType {
                argument: STATION_ID_COLUMN.to_string(),
                expected: "Utf8 array".to_string(),
                found: column.data_type().to_string(),
            })
    }

    pub fn event_time_array(&self) -> Result<&TimestampMillisecondArray> {
        let column = self.column(EVENT_TIME_COLUMN)?;
        column
            .as_any()
            .downcast_ref::<TimestampMillisecondArray>()
            .ok_or_else(|| ProcessingError::InvalidInputType {
                argument: EVENT_TIME_COLUMN.to_string(),
                expected: "Timestamp(Millisecond) array".to_string(),
                found: column.data_type().to_string(),
            })
    }

    pub fn event_times(&self) -> Result<Vec<DateTime<Utc>>> {
        self.event_time_array()?
            .values()
            .iter()
            .map(|ms| {
                DateTime::from_timestamp_millis(*ms).ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!("Timestamp out of range: {}ms", ms))
                })
            })
            .collect()
    }

    /// Replace an existing column; the table is untouched on error
    pub fn replace_column(&mut self, name: &str, array: ArrayRef) -> Result<()> {
        if !self.has_column(name) {
            return Err(ProcessingError::missing_column(name));
        }
        self.set_column(name, array)
    }

    /// Replace `name` in place, or append it as the last column
    pub fn set_column(&mut self, name: &str, array: ArrayRef) -> Result<()> {
        if array.len() != self.num_rows() {
            return Err(ProcessingError::ShapeMismatch {
                argument: name.to_string(),
                expected: self.num_rows(),
                found: array.len(),
            });
        }

        let schema = self.batch.schema();
        let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        let field: FieldRef = Arc::new(Field::new(name, array.data_type().clone(), true));

        match schema.index_of(name) {
            Ok(index) => {
                fields[index] = field;
                columns[index] = array;
            }
            Err(_) => {
                fields.push(field);
                columns.push(array);
            }
        }

        self.batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        Ok(())
    }

    /// Distinct station ids in first-appearance order
    pub fn station_ids(&self) -> Result<Vec<String>> {
        let ids = self.station_id_array()?;
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();

        for id in ids.iter().flatten() {
            if seen.insert(id) {
                ordered.push(id.to_string());
            }
        }

        Ok(ordered)
    }

    /// Rows belonging to one station (possibly none)
    pub fn filter_station(&self, station_id: &str) -> Result<ObservationTable> {
        let ids = self.station_id_array()?;
        let mask: BooleanArray = ids.iter().map(|id| Some(id == Some(station_id))).collect();
        let batch = filter_record_batch(&self.batch, &mask)?;
        Ok(Self { batch })
    }

    /// Split into per-station tables, in first-appearance order
    pub fn partition_by_station(&self) -> Result<Vec<(String, ObservationTable)>> {
        self.station_ids()?
            .into_iter()
            .map(|id| {
                let station = self.filter_station(&id)?;
                Ok((id, station))
            })
            .collect()
    }
}

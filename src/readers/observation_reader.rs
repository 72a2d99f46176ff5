use crate::error::{ProcessingError, Result};
use crate::models::{ColumnSet, ObservationRecord, ObservationTable};
use crate::utils::constants::{
    DEW_POINT_COLUMN, EVENT_TIME_COLUMN, HUMIDITY_COLUMN, STATION_ID_COLUMN, TEMPERATURE_COLUMN,
};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw CSV row before timestamp parsing
#[derive(Debug, Deserialize)]
struct CsvRow {
    station_id: String,
    event_time: String,
    #[serde(default)]
    outdoor_temperature: Option<f64>,
    #[serde(default)]
    outdoor_humidity: Option<f64>,
    #[serde(default)]
    dew_point: Option<f64>,
}

pub struct ObservationReader {
    delimiter: u8,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load a CSV file into a columnar observation table
    pub fn read_table(&self, path: &Path) -> Result<ObservationTable> {
        info!(path = %path.display(), "Loading observations");
        let file = File::open(path)?;
        self.read_table_from(file)
    }

    pub fn read_table_from<R: Read>(&self, source: R) -> Result<ObservationTable> {
        let (records, columns) = self.read_records_from(source)?;
        ObservationTable::from_records(&records, columns)
    }

    /// Read row-oriented records plus the optional columns the header declared
    pub fn read_records_from<R: Read>(
        &self,
        source: R,
    ) -> Result<(Vec<ObservationRecord>, ColumnSet)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let has_header = |name: &str| headers.iter().any(|h| h == name);

        for required in [STATION_ID_COLUMN, EVENT_TIME_COLUMN] {
            if !has_header(required) {
                return Err(ProcessingError::missing_column(required));
            }
        }

        let columns = ColumnSet {
            temperature: has_header(TEMPERATURE_COLUMN),
            humidity: has_header(HUMIDITY_COLUMN),
            dew_point: has_header(DEW_POINT_COLUMN),
        };
        debug!(?columns, "Detected optional columns");

        let mut records = Vec::new();
        let mut implausible_humidity = 0usize;

        for (index, row_result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row_result?;
            // Header is line 1
            let line = index + 2;

            let event_time = ObservationRecord::parse_event_time(&row.event_time).map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "Line {}: invalid event_time '{}'",
                    line, row.event_time
                ))
            })?;

            let record = ObservationRecord::new(
                row.station_id,
                event_time,
                row.outdoor_temperature,
                row.outdoor_humidity,
                row.dew_point,
            );

            if !record.has_valid_humidity() {
                implausible_humidity += 1;
            }

            records.push(record);
        }

        if implausible_humidity > 0 {
            warn!(
                count = implausible_humidity,
                "Records with relative humidity outside 0-100%"
            );
        }
        info!(records = records.len(), "Loaded observations");

        Ok((records, columns))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

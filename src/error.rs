use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Invalid input type for '{argument}': expected {expected}, found {found}")]
    InvalidInputType {
        argument: String,
        expected: String,
        found: String,
    },

    #[error("Shape mismatch: '{argument}' has shape ({found},), expected ({expected},)")]
    ShapeMismatch {
        argument: String,
        expected: usize,
        found: usize,
    },

    #[error("Missing required column: '{column}'")]
    MissingColumn { column: String },

    #[error("No data found for station ID: {station_id}")]
    NoDataForStation { station_id: String },

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Plot rendering error: {0}")]
    Plot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProcessingError {
    pub fn missing_column(column: &str) -> Self {
        ProcessingError::MissingColumn {
            column: column.to_string(),
        }
    }

    /// True for the input-validation failures that abort a run.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            ProcessingError::InvalidInputType { .. }
                | ProcessingError::ShapeMismatch { .. }
                | ProcessingError::MissingColumn { .. }
        )
    }
}

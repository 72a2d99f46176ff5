/// Column names of the observation table
pub const STATION_ID_COLUMN: &str = "station_id";
pub const EVENT_TIME_COLUMN: &str = "event_time";
pub const TEMPERATURE_COLUMN: &str = "outdoor_temperature";
pub const HUMIDITY_COLUMN: &str = "outdoor_humidity";
pub const DEW_POINT_COLUMN: &str = "dew_point";
pub const WET_BULB_COLUMN: &str = "wet_bulb";

/// Timestamp format of the `event_time` column
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Values above this are read as Fahrenheit
pub const DEFAULT_FAHRENHEIT_THRESHOLD: f64 = 50.0;

/// Heat-stress reference lines (wet-bulb, °C)
pub const WET_BULB_CAUTION: f64 = 30.0;
pub const WET_BULB_DANGER: f64 = 35.0;

/// Rendering defaults
pub const DEFAULT_PLOT_WIDTH: u32 = 1000;
pub const DEFAULT_PLOT_HEIGHT: u32 = 900;
pub const DEFAULT_OVERVIEW_COLUMNS: usize = 5;
pub const DEFAULT_OVERVIEW_ROWS: usize = 4;
pub const DEFAULT_OVERVIEW_CELL_WIDTH: u32 = 400;
pub const DEFAULT_OVERVIEW_CELL_HEIGHT: u32 = 300;
pub const DEFAULT_PLOT_DIR: &str = "plots";
pub const DEFAULT_INPUT_FILE: &str = "data.csv";

/// Parquet defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

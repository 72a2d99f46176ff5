use crate::utils::constants::{DEFAULT_INPUT_FILE, DEFAULT_PLOT_DIR};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-wetbulb")]
#[command(about = "Wet-bulb temperature estimation and plots for weather-station telemetry")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate wet-bulb temperature and render per-station plots
    Analyze {
        #[arg(short, long, default_value = DEFAULT_INPUT_FILE, help = "Input telemetry CSV")]
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_PLOT_DIR)]
        output_dir: PathBuf,

        #[arg(
            short,
            long = "station-id",
            help = "Station to render, repeatable [default: every station in the input]"
        )]
        station_id: Vec<String>,

        #[arg(long, help = "Also render a grid of all stations")]
        overview: bool,

        #[arg(long, help = "Write the augmented table to this Parquet file")]
        parquet: Option<PathBuf>,

        #[arg(long, default_value = "snappy")]
        compression: String,

        #[arg(short, long, help = "Settings file (TOML, JSON or YAML)")]
        config: Option<PathBuf>,

        #[arg(long, help = "TTF/OTF font for plot labels")]
        font: Option<PathBuf>,

        #[arg(long, help = "Image format: png or svg")]
        format: Option<String>,

        #[arg(long, help = "Skip Fahrenheit to Celsius normalization")]
        no_normalize: bool,

        #[arg(long, help = "Require a dew_point column")]
        require_dew_point: bool,

        #[arg(long, help = "Hide the progress spinner")]
        quiet: bool,
    },

    /// Find stations by sample count and first observation day
    Identify {
        #[arg(short, long, default_value = DEFAULT_INPUT_FILE)]
        input: PathBuf,

        #[arg(long, help = "First observation day (YYYY-MM-DD)")]
        first_day: NaiveDate,

        #[arg(long, help = "Expected number of samples")]
        samples: Option<usize>,

        #[arg(long, help = "Reference station name, for reporting")]
        name: Option<String>,

        #[arg(long, help = "Print matches as JSON")]
        json: bool,
    },

    /// Display information about an exported Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5", help = "Stations to list (0 = none)")]
        stations: usize,
    },
}

pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{overview_plot_filename, station_plot_filename, ImageFormat};
pub use progress::ProgressReporter;

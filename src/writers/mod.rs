pub mod parquet_writer;
pub mod plot_writer;

pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use plot_writer::{PlotWriter, RenderSummary};

use crate::error::{ProcessingError, Result};
use crate::models::ObservationTable;
use crate::processors::AugmentationReport;
use crate::readers::ObservationReader;
use crate::settings::Settings;
use crate::utils::constants::COMPRESSION_SNAPPY;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ParquetWriter, PlotWriter, RenderSummary};
use std::path::{Path, PathBuf};
use tracing::info;

/// What to produce from one telemetry file
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Stations to render; empty renders every station in the input
    pub station_ids: Vec<String>,
    pub overview: bool,
    pub parquet: Option<PathBuf>,
    pub compression: String,
}

impl AnalysisRequest {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            station_ids: Vec::new(),
            overview: false,
            parquet: None,
            compression: COMPRESSION_SNAPPY.to_string(),
        }
    }

    pub fn with_station_ids(mut self, station_ids: Vec<String>) -> Self {
        self.station_ids = station_ids;
        self
    }

    pub fn with_overview(mut self, overview: bool) -> Self {
        self.overview = overview;
        self
    }

    pub fn with_parquet(mut self, path: Option<PathBuf>, compression: &str) -> Self {
        self.parquet = path;
        self.compression = compression.to_string();
        self
    }
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub table: ObservationTable,
    pub augmentation: AugmentationReport,
    pub render: RenderSummary,
    pub overview: Vec<PathBuf>,
    pub parquet: Option<PathBuf>,
}

/// Load, augment and render: the whole batch job behind `analyze`
pub struct AnalysisPipeline {
    settings: Settings,
    reader: ObservationReader,
}

impl AnalysisPipeline {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            reader: ObservationReader::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read the CSV and attach the wet-bulb column
    pub fn load(
        &self,
        input: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<(ObservationTable, AugmentationReport)> {
        if let Some(p) = progress {
            p.set_message("Reading observations...");
        }
        let mut table = self.reader.read_table(input)?;

        if let Some(p) = progress {
            p.set_message("Estimating wet-bulb temperature...");
        }
        let report = self.settings.augmenter().augment(&mut table)?;

        Ok((table, report))
    }

    pub fn run(
        &self,
        request: &AnalysisRequest,
        progress: Option<&ProgressReporter>,
    ) -> Result<AnalysisOutcome> {
        let (table, augmentation) = self.load(&request.input, progress)?;
        info!(
            rows = augmentation.rows,
            nan = augmentation.nan_results,
            "Augmented observations"
        );

        let parquet = match &request.parquet {
            Some(path) => {
                if let Some(p) = progress {
                    p.set_message("Writing Parquet file...");
                }
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                ParquetWriter::new()
                    .with_compression(&request.compression)?
                    .write_table(&table, path)?;
                Some(path.clone())
            }
            None => None,
        };

        let station_ids = if request.station_ids.is_empty() {
            table.station_ids()?
        } else {
            request.station_ids.clone()
        };
        if station_ids.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "No observations in {}",
                request.input.display()
            )));
        }

        let writer = PlotWriter::new(&self.settings.render, &request.output_dir)?;
        let render = writer.render_stations(&table, &station_ids, progress)?;

        let overview = if request.overview {
            if let Some(p) = progress {
                p.set_message("Rendering overview...");
            }
            writer.render_overview(&table)?
        } else {
            Vec::new()
        };

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Rendered {} of {} stations",
                render.rendered.len(),
                station_ids.len()
            ));
        }

        Ok(AnalysisOutcome {
            table,
            augmentation,
            render,
            overview,
            parquet,
        })
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::WET_BULB_COLUMN;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &Path) -> PathBuf {
        let path = dir.join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "station_id,event_time,outdoor_temperature,outdoor_humidity").unwrap();
        writeln!(file, "195790,2024-07-15 06:00:00 UTC,77.0,50").unwrap();
        writeln!(file, "195790,2024-07-15 12:00:00 UTC,30.0,80").unwrap();
        writeln!(file, "195790,2024-07-16 06:00:00 UTC,25.0,50").unwrap();
        writeln!(file, "195795,2024-07-15 06:00:00 UTC,20.0,100").unwrap();
        path
    }

    #[test]
    fn test_load_normalizes_and_augments() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_csv(dir.path());

        let (table, report) = AnalysisPipeline::default().load(&input, None)?;
        assert_eq!(report.rows, 4);
        assert_eq!(report.normalization.map(|n| n.converted_values), Some(1));

        // 77°F is 25°C, so the first and third rows agree
        let wet_bulb = table.float_column(WET_BULB_COLUMN)?;
        assert!((wet_bulb.value(0) - 17.99814746834343).abs() < 1e-9);
        assert!((wet_bulb.value(0) - wet_bulb.value(2)).abs() < 1e-9);

        Ok(())
    }

    #[test]
    fn test_run_skips_unknown_station() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_csv(dir.path());
        let output = dir.path().join("plots");

        let request = AnalysisRequest::new(&input, &output)
            .with_station_ids(vec!["195790".to_string(), "999999".to_string()]);
        let outcome = AnalysisPipeline::default().run(&request, None)?;

        assert_eq!(outcome.render.rendered, vec![output.join("station_195790.png")]);
        assert_eq!(outcome.render.skipped, vec!["999999".to_string()]);
        assert!(outcome.overview.is_empty());

        Ok(())
    }

    #[test]
    fn test_run_all_stations_with_overview_and_parquet() -> Result<()> {
        let dir = TempDir::new()?;
        let input = write_csv(dir.path());
        let output = dir.path().join("plots");
        let parquet = dir.path().join("out").join("augmented.parquet");

        let request = AnalysisRequest::new(&input, &output)
            .with_overview(true)
            .with_parquet(Some(parquet.clone()), "zstd");
        let outcome = AnalysisPipeline::default().run(&request, None)?;

        assert_eq!(outcome.render.rendered.len(), 2);
        assert!(outcome.render.skipped.is_empty());
        assert_eq!(outcome.overview, vec![output.join("overview.png")]);
        assert!(outcome.overview[0].exists());
        assert_eq!(outcome.parquet.as_deref(), Some(parquet.as_path()));

        let restored = ParquetWriter::new().read_table(&parquet)?;
        assert_eq!(restored.num_rows(), 4);
        assert!(restored.has_column(WET_BULB_COLUMN));

        Ok(())
    }

    #[test]
    fn test_run_with_missing_humidity_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("data.csv");
        std::fs::write(
            &input,
            "station_id,event_time,outdoor_temperature\n1,2024-07-15 06:00:00 UTC,25\n",
        )?;

        let request = AnalysisRequest::new(&input, dir.path().join("plots"));
        let err = AnalysisPipeline::default().run(&request, None).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn { .. }));

        Ok(())
    }
}

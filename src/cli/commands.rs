use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::models::StationReference;
use crate::processors::{summarize_stations, AnalysisPipeline, AnalysisRequest, StationIdentifier};
use crate::readers::ObservationReader;
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;
use tracing::debug;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            station_id,
            overview,
            parquet,
            compression,
            config,
            font,
            format,
            no_normalize,
            require_dew_point,
            quiet,
        } => {
            let mut settings = Settings::load(config.as_deref())?;
            if font.is_some() {
                settings.render.font_path = font;
            }
            if let Some(format) = format {
                settings.render.format = format;
            }
            if no_normalize {
                settings.normalizer.enabled = false;
            }
            if require_dew_point {
                settings.require_dew_point = true;
            }
            settings.check()?;
            debug!(?settings, "Effective settings");

            println!("Analyzing station telemetry...");
            println!("Input file: {}", input.display());
            println!("Output directory: {}", output_dir.display());

            let request = AnalysisRequest::new(input, output_dir)
                .with_station_ids(station_id)
                .with_overview(overview)
                .with_parquet(parquet, &compression);

            let progress = ProgressReporter::new_spinner("Processing data...", quiet);
            let outcome = AnalysisPipeline::new(settings).run(&request, Some(&progress))?;

            println!("\n{}", outcome.augmentation.summary());
            println!("\n{}", outcome.render.summary());
            for path in &outcome.render.rendered {
                println!("  {}", path.display());
            }
            for path in &outcome.overview {
                println!("Overview: {}", path.display());
            }
            if let Some(path) = &outcome.parquet {
                let file_info = ParquetWriter::new().get_file_info(path)?;
                println!("\n{}", file_info.summary());
            }

            println!("Analysis complete!");
        }

        Commands::Identify {
            input,
            first_day,
            samples,
            name,
            json,
        } => {
            let mut reference = StationReference::new(first_day);
            if let Some(count) = samples {
                reference = reference.with_sample_count(count);
            }
            if let Some(name) = name {
                reference = reference.with_name(name);
            }
            let identifier = StationIdentifier::new(reference)?;

            let table = ObservationReader::new().read_table(&input)?;
            let matches = identifier.identify(&table)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
                return Ok(());
            }

            let label = identifier
                .reference()
                .name
                .clone()
                .unwrap_or_else(|| "reference station".to_string());
            if matches.is_empty() {
                println!("No station matches {} (first day {})", label, first_day);
            } else {
                println!("Candidates for {}:", label);
                for station in &matches {
                    println!("  {}", station.summary());
                }
            }
        }

        Commands::Info { file, stations } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            let table = writer.read_table(&file)?;

            println!("\nColumns: {}", table.column_names().join(", "));

            let summaries = summarize_stations(&table)?;
            println!("Stations: {}", summaries.len());
            for station in summaries.iter().take(stations) {
                println!("  {}", station.summary());
            }
            if summaries.len() > stations && stations > 0 {
                println!("  ... {} more", summaries.len() - stations);
            }

            println!("\nFile Details:");
            println!("{}", file_info.summary());
        }
    }

    Ok(())
}

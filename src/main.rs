use anyhow::Context;
use clap::Parser;
use station_wetbulb::cli::{run, Cli};
use std::fs::File;
use std::sync::Mutex;
use tracing::Level;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            subscriber
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => subscriber.with_writer(std::io::stderr).init(),
    }

    run(cli)?;
    Ok(())
}

use crate::analyzers::OutputAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::fetchers::HttpDownloader;
use crate::processors::{Pipeline, PipelineConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Commands::Process) {
        Commands::Process => {
            let config = PipelineConfig::default().with_progress(true);
            info!(
                cache_dir = %config.cache_dir.display(),
                output = %config.output_path.display(),
                sources = config.sources.len(),
                "starting run"
            );

            let mut pipeline = Pipeline::new(config, HttpDownloader::new()?)?;
            let summary = pipeline.run()?;

            println!("\n{}", summary.generate_summary());
            if !summary.is_complete() {
                warn!("output is incomplete, see failures above");
            }
        }

        Commands::Fetch => {
            let config = PipelineConfig::default().with_progress(true);
            let pipeline = Pipeline::new(config, HttpDownloader::new()?)?;
            let report = pipeline.fetch_all();

            println!(
                "Fetched {} sources: {} downloaded, {} cached, {} failed",
                report.total(),
                report.downloaded,
                report.cached,
                report.failures.len()
            );
            for failure in &report.failures {
                println!("  - {}: {}", failure.source, failure.error);
            }
        }

        Commands::Info { file, json } => {
            let stats = OutputAnalyzer::new().analyze(&file)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Analyzing output file: {}", file.display());
                println!("\n{}", stats.detailed_summary());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when run is called from a test harness
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

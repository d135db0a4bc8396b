use anyhow::Context;
use clap::Parser;
use ukclimate_extractor::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("climate extraction failed")
}

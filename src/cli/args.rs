use crate::utils::constants::OUTPUT_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ukclimate-extractor")]
#[command(about = "Flatten Met Office UK regional climate series into one CSV")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every series and write the flattened CSV (default)
    Process,

    /// Populate the local cache without writing any output
    Fetch,

    /// Summarise an existing output file
    Info {
        #[arg(short, long, default_value = OUTPUT_PATH)]
        file: PathBuf,

        #[arg(long, help = "Print the statistics as JSON")]
        json: bool,
    },
}

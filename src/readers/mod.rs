pub mod climate_reader;

pub use climate_reader::{ClimateReader, FieldSplitter, ParseOutcome};

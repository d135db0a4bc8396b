pub mod output_analyzer;

pub use output_analyzer::{OutputAnalyzer, OutputStatistics};

pub mod pipeline;
pub mod summary;

pub use pipeline::{Pipeline, PipelineConfig, PipelineStage};
pub use summary::{FetchReport, ParseReport, RunSummary, SourceFailure};

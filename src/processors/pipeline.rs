use crate::error::Result;
use crate::fetchers::{Download, FetchOutcome, SourceFetcher};
use crate::models::SourceFile;
use crate::processors::summary::{FetchReport, ParseReport, RunSummary, SourceFailure};
use crate::readers::ClimateReader;
use crate::utils::constants::{BASE_URL, CACHE_DIR, OUTPUT_PATH};
use crate::utils::progress::ProgressReporter;
use crate::writers::ClimateCsvWriter;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Where a run reads from and writes to.
///
/// `Default` uses the fixed archive URL and paths; tests point the paths at
/// scratch directories.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub output_path: PathBuf,
    pub sources: Vec<SourceFile>,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            cache_dir: PathBuf::from(CACHE_DIR),
            output_path: PathBuf::from(OUTPUT_PATH),
            sources: SourceFile::all(),
            show_progress: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceFile>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    OutputOpened,
    AllFetched,
    AllParsedAndWritten,
    Closed,
}

/// Fetch every source, then flatten every cached source into the output.
///
/// Per-source failures are recorded in the summary and never stop the run.
/// Only opening or closing the output file can fail `run`.
pub struct Pipeline<D> {
    config: PipelineConfig,
    fetcher: SourceFetcher<D>,
    reader: ClimateReader,
    stage: PipelineStage,
}

impl<D: Download> Pipeline<D> {
    pub fn new(config: PipelineConfig, downloader: D) -> Result<Self> {
        let fetcher = SourceFetcher::new(downloader, config.base_url.clone(), config.cache_dir.clone());
        Ok(Self {
            config,
            fetcher,
            reader: ClimateReader::new()?,
            stage: PipelineStage::Init,
        })
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn advance(&mut self, next: PipelineStage) {
        info!(from = ?self.stage, to = ?next, "pipeline stage");
        self.stage = next;
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        self.stage = PipelineStage::Init;

        let mut writer = ClimateCsvWriter::create(&self.config.output_path)?;
        self.advance(PipelineStage::OutputOpened);

        let fetch = self.fetch_all();
        self.advance(PipelineStage::AllFetched);

        let mut parse = self.parse_all(&mut writer);
        self.advance(PipelineStage::AllParsedAndWritten);

        parse.rows_written = writer.close()?;
        self.advance(PipelineStage::Closed);

        Ok(RunSummary {
            output_path: self.config.output_path.clone(),
            fetch,
            parse,
        })
    }

    /// Make sure every source has a local copy.
    pub fn fetch_all(&self) -> FetchReport {
        let mut report = FetchReport::default();
        let progress = self.progress("fetch");

        for source in &self.config.sources {
            progress.start(source);
            match self.fetcher.ensure_local(source) {
                Ok(FetchOutcome::Cached) => report.cached += 1,
                Ok(FetchOutcome::Downloaded { bytes }) => {
                    report.downloaded += 1;
                    report.bytes_downloaded += bytes;
                }
                Err(e) => {
                    error!(source = %source, url = %source.url(&self.config.base_url), error = %e, "fetch failed");
                    report.failures.push(SourceFailure::new(*source, e));
                }
            }
            progress.advance();
        }

        progress.finish_with_message(&format!(
            "{} downloaded, {} cached, {} failed",
            report.downloaded,
            report.cached,
            report.failures.len()
        ));
        report
    }

    fn parse_all(&self, writer: &mut ClimateCsvWriter) -> ParseReport {
        let mut report = ParseReport::default();
        let progress = self.progress("parse");

        for source in &self.config.sources {
            progress.start(source);
            let path = source.local_path(&self.config.cache_dir);

            let mut rows_failed = 0;
            let result = self.reader.read_file(&path, source, |row| {
                if let Err(e) = writer.append_row(&row) {
                    error!(source = %source, year = %row.year, key = %row.key, error = %e, "write failed");
                    rows_failed += 1;
                }
            });
            report.rows_failed += rows_failed;

            match result {
                Ok(outcome) => {
                    report.rows_parsed += outcome.rows;
                    report.rejected_lines += outcome.rejected_lines;
                    match outcome.read_error {
                        Some(e) => report.failures.push(SourceFailure::new(*source, e)),
                        None => report.files_parsed += 1,
                    }
                }
                Err(e) => {
                    warn!(source = %source, path = %path.display(), error = %e, "parse failed");
                    report.failures.push(SourceFailure::new(*source, e));
                }
            }
            progress.advance();
        }

        progress.finish_with_message(&format!("{} files parsed", report.files_parsed));
        report
    }

    fn progress(&self, stage: &str) -> ProgressReporter {
        if self.config.show_progress {
            ProgressReporter::new(self.config.sources.len() as u64, stage, false)
        } else {
            ProgressReporter::silent()
        }
    }
}

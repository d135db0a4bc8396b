use crate::models::SourceFile;
use serde::Serialize;
use std::path::PathBuf;

/// A source that dropped out of a stage, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source: SourceFile,
    pub error: String,
}

impl SourceFailure {
    pub fn new(source: SourceFile, error: impl ToString) -> Self {
        Self {
            source,
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchReport {
    pub downloaded: usize,
    pub cached: usize,
    pub bytes_downloaded: u64,
    pub failures: Vec<SourceFailure>,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.downloaded + self.cached + self.failures.len()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub files_parsed: usize,
    pub rows_parsed: usize,
    pub rows_written: usize,
    pub rows_failed: usize,
    pub rejected_lines: usize,
    pub failures: Vec<SourceFailure>,
}

/// Outcome of a whole run. Failures are listed here rather than marked in
/// the output file.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub fetch: FetchReport,
    pub parse: ParseReport,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.fetch.failures.is_empty()
            && self.parse.failures.is_empty()
            && self.parse.rows_failed == 0
            && self.parse.rejected_lines == 0
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Run Summary\n");
        summary.push_str("===========\n");
        summary.push_str(&format!("Output file: {}\n", self.output_path.display()));
        summary.push_str(&format!(
            "Fetch: {} downloaded ({} bytes), {} cached, {} failed\n",
            self.fetch.downloaded,
            self.fetch.bytes_downloaded,
            self.fetch.cached,
            self.fetch.failures.len()
        ));
        summary.push_str(&format!(
            "Parse: {} files parsed, {} failed, {} lines rejected\n",
            self.parse.files_parsed,
            self.parse.failures.len(),
            self.parse.rejected_lines
        ));
        summary.push_str(&format!(
            "Rows: {} written, {} failed to write\n",
            self.parse.rows_written, self.parse.rows_failed
        ));

        let failures: Vec<_> = self
            .fetch
            .failures
            .iter()
            .map(|f| ("fetch", f))
            .chain(self.parse.failures.iter().map(|f| ("parse", f)))
            .collect();

        if !failures.is_empty() {
            summary.push_str("\nFailures:\n");
            for (stage, failure) in failures.iter().take(20) {
                summary.push_str(&format!(
                    "  - [{}] {}: {}\n",
                    stage, failure.source, failure.error
                ));
            }
            if failures.len() > 20 {
                summary.push_str(&format!("  ... and {} more\n", failures.len() - 20));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parameter, Region};

    fn summary() -> RunSummary {
        RunSummary {
            output_path: PathBuf::from("output/out.csv"),
            fetch: FetchReport {
                downloaded: 1,
                cached: 2,
                bytes_downloaded: 512,
                failures: vec![SourceFailure::new(
                    SourceFile::new(Region::Wales, Parameter::Tmin),
                    "HTTP 404",
                )],
            },
            parse: ParseReport {
                files_parsed: 3,
                rows_parsed: 36,
                rows_written: 36,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_generate_summary() {
        let text = summary().generate_summary();

        assert!(text.contains("Fetch: 1 downloaded (512 bytes), 2 cached, 1 failed"));
        assert!(text.contains("Rows: 36 written, 0 failed to write"));
        assert!(text.contains("[fetch] Wales/Tmin: HTTP 404"));
    }

    #[test]
    fn test_completeness() {
        let mut run = summary();
        assert!(!run.is_complete());

        run.fetch.failures.clear();
        assert!(run.is_complete());
        assert_eq!(run.fetch.total(), 3);
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(summary()).unwrap();

        assert_eq!(json["fetch"]["failures"][0]["source"]["region"], "Wales");
        assert_eq!(json["parse"]["rows_written"], 36);
    }
}

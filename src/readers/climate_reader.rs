use crate::error::{ProcessingError, Result};
use crate::models::{DataRow, DataValue, HeaderKeys, SourceFile};
use crate::utils::constants::{
    DATA_MAX_SEPARATOR_RUN, DEFAULT_BUFFER_SIZE, HEADER_LINE_INDEX, HEADER_MAX_SEPARATOR_RUN,
};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Splits a fixed-width line on whitespace runs of bounded length.
///
/// A run longer than the bound is consumed as several separators, so the
/// gap left by a blank column produces an empty field. A leading empty field
/// is kept when the line starts with whitespace; trailing empty fields are
/// dropped.
pub struct FieldSplitter {
    pattern: Regex,
}

impl FieldSplitter {
    pub fn new(max_run: usize) -> Result<Self> {
        if max_run == 0 {
            return Err(ProcessingError::Config(
                "Separator run length must be at least 1".to_string(),
            ));
        }
        let pattern = Regex::new(&format!(r"[ \t\n\x0B\f\r]{{1,{}}}", max_run))
            .map_err(|e| ProcessingError::Config(format!("Invalid separator pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let mut fields: Vec<&str> = self.pattern.split(line).collect();
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub rows: usize,
    pub rejected_lines: usize,
    /// Set when the table could not be read to the end
    pub read_error: Option<String>,
}

/// Reader for the archive's year-ordered text tables.
///
/// Lines before the header are metadata. The header line supplies the column
/// labels, and every later line is one year of values.
pub struct ClimateReader {
    header_splitter: FieldSplitter,
    data_splitter: FieldSplitter,
}

impl ClimateReader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header_splitter: FieldSplitter::new(HEADER_MAX_SEPARATOR_RUN)?,
            data_splitter: FieldSplitter::new(DATA_MAX_SEPARATOR_RUN)?,
        })
    }

    pub fn parse_header(&self, line: &str) -> HeaderKeys {
        HeaderKeys::new(
            self.header_splitter
                .split(line)
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }

    /// Parse one data line into a row per value, labelled by `keys`.
    ///
    /// The first field is the year. A line with more fields than `keys` is
    /// rejected whole.
    pub fn parse_line(
        &self,
        line_index: usize,
        line: &str,
        keys: &HeaderKeys,
        source: &SourceFile,
    ) -> Result<Vec<DataRow>> {
        let fields = self.data_splitter.split(line);
        let Some((year, values)) = fields.split_first() else {
            return Ok(Vec::new());
        };

        if !values.is_empty() && fields.len() > keys.len() {
            return Err(ProcessingError::ColumnMismatch {
                line: line_index,
                tokens: fields.len(),
                keys: keys.len(),
            });
        }

        let rows = values
            .iter()
            .zip(keys.iter().skip(1))
            .map(|(token, key)| {
                DataRow::new(
                    source.region,
                    source.parameter,
                    *year,
                    key,
                    DataValue::from_token(token),
                )
            })
            .collect();

        Ok(rows)
    }

    /// Stream every row of the file at `path` into `sink`.
    ///
    /// Rejected lines are logged and counted; they never stop the file.
    pub fn read_file<F>(&self, path: &Path, source: &SourceFile, sink: F) -> Result<ParseOutcome>
    where
        F: FnMut(DataRow),
    {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader, path, source, sink)
    }

    /// Stream rows from an already opened table. `path` only labels diagnostics.
    ///
    /// A read error part way through ends the table early: the rows already
    /// handed to `sink` are counted and the error is kept in
    /// `ParseOutcome::read_error`.
    pub fn read_from<R, F>(
        &self,
        mut reader: R,
        path: &Path,
        source: &SourceFile,
        mut sink: F,
    ) -> Result<ParseOutcome>
    where
        R: BufRead,
        F: FnMut(DataRow),
    {
        let mut outcome = ParseOutcome::default();
        let mut keys: Option<HeaderKeys> = None;
        let mut buf = Vec::new();
        let mut line_index = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(source = %source, path = %path.display(), error = %e, "read failed part way");
                    outcome.read_error = Some(e.to_string());
                    return Ok(outcome);
                }
            }

            for line in split_lines(&buf) {
                if line_index == HEADER_LINE_INDEX {
                    let header = self.parse_header(&line);
                    debug!(source = %source, keys = header.len(), "captured header");
                    keys = Some(header);
                } else if let Some(ref keys) = keys {
                    match self.parse_line(line_index, &line, keys, source) {
                        Ok(rows) => {
                            outcome.rows += rows.len();
                            rows.into_iter().for_each(&mut sink);
                        }
                        Err(e) => {
                            warn!(source = %source, path = %path.display(), error = %e, "rejected line");
                            outcome.rejected_lines += 1;
                        }
                    }
                }

                line_index += 1;
            }
        }

        if keys.is_none() {
            return Err(ProcessingError::MissingHeader(path.to_path_buf()));
        }

        Ok(outcome)
    }

    /// Collect every row of the file at `path`.
    pub fn read_rows(&self, path: &Path, source: &SourceFile) -> Result<(Vec<DataRow>, ParseOutcome)> {
        let mut rows = Vec::new();
        let outcome = self.read_file(path, source, |row| rows.push(row))?;
        Ok((rows, outcome))
    }
}

/// Split one `\n`-terminated chunk into lines. A line ends at `\n`, `\r\n`
/// or a lone `\r`.
fn split_lines(chunk: &[u8]) -> Vec<String> {
    let mut end = chunk.len();
    if end > 0 && chunk[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && chunk[end - 1] == b'\r' {
        end -= 1;
    }
    chunk[..end]
        .split(|&b| b == b'\r')
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect()
}

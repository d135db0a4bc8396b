use crate::error::{ProcessingError, Result};
use crate::models::DataRow;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(windows)]
const LINE_TERMINATOR: Terminator = Terminator::CRLF;
#[cfg(not(windows))]
const LINE_TERMINATOR: Terminator = Terminator::Any(b'\n');

/// Flattened output: one `region,parameter,year,key,value,` line per row.
///
/// Fields are never quoted and every line keeps a trailing comma, which
/// downstream consumers of this file rely on. There is no header row.
///
/// Each row is encoded in full before any of it reaches the output, so a
/// failed write loses that row only.
pub struct ClimateCsvWriter<W: Write = BufWriter<File>> {
    out: W,
    line: Vec<u8>,
    path: PathBuf,
    rows_written: usize,
}

impl ClimateCsvWriter {
    /// Create or truncate the output file, creating its directory if needed
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        Ok(Self::from_writer(
            BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file),
            path,
        ))
    }
}

impl<W: Write> ClimateCsvWriter<W> {
    /// Write rows to `out`; `path` names the output in errors
    pub fn from_writer(out: W, path: impl Into<PathBuf>) -> Self {
        Self {
            out,
            line: Vec::new(),
            path: path.into(),
            rows_written: 0,
        }
    }

    pub fn append_row(&mut self, row: &DataRow) -> Result<()> {
        let line = encode_line(std::mem::take(&mut self.line), row)
            .map_err(|source| self.write_error(source))?;
        let written = self.out.write_all(&line);
        self.line = line;
        written.map_err(|source| self.write_error(source))?;

        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered rows and release the output
    pub fn close(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.rows_written)
    }

    fn write_error(&self, source: io::Error) -> ProcessingError {
        ProcessingError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Encode one row, terminator included, reusing `buf`.
fn encode_line(mut buf: Vec<u8>, row: &DataRow) -> io::Result<Vec<u8>> {
    buf.clear();
    let mut line = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(LINE_TERMINATOR)
        .from_writer(buf);

    let [region, parameter, year, key, value] = row.fields();
    line.write_record([region, parameter, year, key, value, ""])?;
    line.into_inner().map_err(|e| e.into_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataValue, Parameter, Region};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn test_rows_keep_trailing_comma() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out/rows.csv");

        let mut writer = ClimateCsvWriter::create(&path)?;
        writer.append_row(&DataRow::new(
            Region::Uk,
            Parameter::Tmax,
            "1900",
            "Jan",
            DataValue::Present("5.1".to_string()),
        ))?;
        writer.append_row(&DataRow::new(
            Region::Uk,
            Parameter::Tmax,
            "1900",
            "Feb",
            DataValue::Missing,
        ))?;
        assert_eq!(writer.close()?, 2);

        let nl = if cfg!(windows) { "\r\n" } else { "\n" };
        let expected = format!("UK,Tmax,1900,Jan,5.1,{nl}UK,Tmax,1900,Feb,N/A,{nl}");
        assert_eq!(fs::read_to_string(&path)?, expected);
        Ok(())
    }

    #[test]
    fn test_fields_are_not_quoted() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("quoted.csv");

        let mut writer = ClimateCsvWriter::create(&path)?;
        writer.append_row(&DataRow::new(
            Region::Wales,
            Parameter::Rainfall,
            "1999",
            "a,b",
            DataValue::Present("\"x\"".to_string()),
        ))?;
        writer.close()?;

        let content = fs::read_to_string(&path)?;
        assert!(content.starts_with("Wales,Rainfall,1999,a,b,\"x\","));
        Ok(())
    }

    #[test]
    fn test_create_truncates() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out.csv");
        fs::write(&path, "old contents\n")?;

        let writer = ClimateCsvWriter::create(&path)?;
        assert_eq!(writer.close()?, 0);

        assert_eq!(fs::read_to_string(&path)?, "");
        Ok(())
    }

    /// Accepts bytes, except for the single write it is told to fail.
    struct FlakySink {
        written: Rc<RefCell<Vec<u8>>>,
        fail_on_write: usize,
        writes: usize,
    }

    impl Write for FlakySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if self.writes == self.fail_on_write {
                return Err(io::Error::new(io::ErrorKind::Other, "disk hiccup"));
            }
            self.written.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn row(year: &str, key: &str, value: &str) -> DataRow {
        DataRow::new(
            Region::England,
            Parameter::Tmax,
            year,
            key,
            DataValue::Present(value.to_string()),
        )
    }

    #[test]
    fn test_failed_write_loses_only_that_row() -> Result<()> {
        let written = Rc::new(RefCell::new(Vec::new()));
        let sink = FlakySink {
            written: Rc::clone(&written),
            fail_on_write: 1,
            writes: 0,
        };
        let mut writer = ClimateCsvWriter::from_writer(sink, "flaky.csv");

        let failed = writer.append_row(&row("1900", "Jan", "5.1"));
        assert!(matches!(failed, Err(ProcessingError::Write { .. })));

        writer.append_row(&row("1900", "Feb", "5.9"))?;
        writer.append_row(&row("1900", "Mar", "7.4"))?;
        writer.append_row(&row("1900", "Apr", "9.8"))?;
        assert_eq!(writer.close()?, 3);

        let nl = if cfg!(windows) { "\r\n" } else { "\n" };
        let expected = format!(
            "England,Tmax,1900,Feb,5.9,{nl}England,Tmax,1900,Mar,7.4,{nl}England,Tmax,1900,Apr,9.8,{nl}"
        );
        assert_eq!(String::from_utf8(written.borrow().clone()).unwrap(), expected);
        Ok(())
    }
}

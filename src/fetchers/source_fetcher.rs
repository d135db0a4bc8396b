use crate::error::{ProcessingError, Result};
use crate::fetchers::Download;
use crate::models::SourceFile;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A local copy already existed; the archive was not contacted
    Cached,
    Downloaded { bytes: u64 },
}

/// Keeps the local cache populated with one file per source.
///
/// The presence of the cache file is the only validity signal: an existing
/// file is never refreshed, and a file left behind by an interrupted copy is
/// not removed.
pub struct SourceFetcher<D> {
    downloader: D,
    base_url: String,
    cache_dir: PathBuf,
}

impl<D: Download> SourceFetcher<D> {
    pub fn new(downloader: D, base_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloader,
            base_url: base_url.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn ensure_local(&self, source: &SourceFile) -> Result<FetchOutcome> {
        let path = source.local_path(&self.cache_dir);
        if path.exists() {
            debug!(source = %source, path = %path.display(), "using cached file");
            return Ok(FetchOutcome::Cached);
        }

        let url = source.url(&self.base_url);
        let mut stream = self.downloader.open(&url)?;

        fs::create_dir_all(&self.cache_dir)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => ProcessingError::AlreadyCached(path.clone()),
                _ => ProcessingError::Io(e),
            })?;

        let mut writer = BufWriter::new(file);
        let bytes = io::copy(&mut stream, &mut writer)?;
        writer.flush()?;

        info!(source = %source, url = %url, bytes, "downloaded");
        Ok(FetchOutcome::Downloaded { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parameter, Region};
    use std::cell::RefCell;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;

    struct StubDownloader {
        body: Option<&'static str>,
        requested: RefCell<Vec<String>>,
    }

    impl StubDownloader {
        fn serving(body: &'static str) -> Self {
            Self {
                body: Some(body),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl Download for StubDownloader {
        fn open(&self, url: &str) -> Result<Box<dyn Read>> {
            self.requested.borrow_mut().push(url.to_string());
            match self.body {
                Some(body) => Ok(Box::new(Cursor::new(body.as_bytes()))),
                None => Err(ProcessingError::Config("unreachable".to_string())),
            }
        }
    }

    #[test]
    fn test_downloads_missing_file() -> Result<()> {
        let cache = TempDir::new()?;
        let fetcher = SourceFetcher::new(
            StubDownloader::serving("hello"),
            "http://archive/",
            cache.path().join("nested"),
        );
        let source = SourceFile::new(Region::England, Parameter::Tmean);

        let outcome = fetcher.ensure_local(&source)?;

        assert_eq!(outcome, FetchOutcome::Downloaded { bytes: 5 });
        assert_eq!(
            fetcher.downloader.requested.borrow().as_slice(),
            ["http://archive/Tmean/date/England.txt"]
        );
        let written = fs::read_to_string(cache.path().join("nested/England_Tmean.txt"))?;
        assert_eq!(written, "hello");
        Ok(())
    }

    #[test]
    fn test_existing_file_skips_transport() -> Result<()> {
        let cache = TempDir::new()?;
        let source = SourceFile::new(Region::Wales, Parameter::Sunshine);
        fs::write(source.local_path(cache.path()), "stale")?;

        let fetcher = SourceFetcher::new(StubDownloader::failing(), "http://archive/", cache.path());
        let outcome = fetcher.ensure_local(&source)?;

        assert_eq!(outcome, FetchOutcome::Cached);
        assert!(fetcher.downloader.requested.borrow().is_empty());
        assert_eq!(fs::read_to_string(source.local_path(cache.path()))?, "stale");
        Ok(())
    }

    #[test]
    fn test_failed_transport_leaves_no_file() -> Result<()> {
        let cache = TempDir::new()?;
        let source = SourceFile::new(Region::Scotland, Parameter::Tmax);

        let fetcher = SourceFetcher::new(StubDownloader::failing(), "http://archive/", cache.path());

        assert!(fetcher.ensure_local(&source).is_err());
        assert!(!source.local_path(cache.path()).exists());
        Ok(())
    }
}

pub mod downloader;
pub mod source_fetcher;

pub use downloader::{Download, HttpDownloader};
pub use source_fetcher::{FetchOutcome, SourceFetcher};

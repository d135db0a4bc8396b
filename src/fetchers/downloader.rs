use crate::error::{ProcessingError, Result};
use std::io::Read;

/// Transport used to pull a source file from the archive.
pub trait Download {
    /// Open a byte stream for `url`. Fails before any bytes are produced
    /// when the request cannot be made or the server refuses it.
    fn open(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// Blocking HTTP transport. Timeouts are left at the client defaults.
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(ProcessingError::ClientBuild)?;

        Ok(Self { client })
    }
}

impl Download for HttpDownloader {
    fn open(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| ProcessingError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProcessingError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(Box::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_build_error_message() {
        let err = reqwest::blocking::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();

        let message = ProcessingError::ClientBuild(err).to_string();
        assert!(message.starts_with("Failed to build HTTP client: "));
    }

    #[test]
    fn test_bad_url_names_the_url() {
        let downloader = HttpDownloader::new().unwrap();

        let err = match downloader.open("not a url") {
            Err(e) => e,
            Ok(_) => panic!("relative URL should not open"),
        };

        assert!(matches!(err, ProcessingError::Network { ref url, .. } if url == "not a url"));
        assert!(err.to_string().contains("for not a url:"));
    }
}

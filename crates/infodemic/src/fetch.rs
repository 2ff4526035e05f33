use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use url::Url;

use crate::prelude::*;

/// Loads source data from remotes or local snapshots.
///
/// A location is either an `http(s)` URL, a `file` URL or a path
/// relative to the project root. Failures are not retried.
pub(crate) struct Fetcher {
    base_dir: PathBuf,
    client: Client,
}

impl Fetcher {
    pub(crate) fn new<P: Into<PathBuf>>(base_dir: P) -> InfodemicResult<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            base_dir: base_dir.into(),
            client,
        })
    }

    /// Returns `true` if the location refers to a HTTP remote.
    pub(crate) fn is_remote(location: &str) -> bool {
        Url::parse(location)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    /// Returns the body of the given location.
    pub(crate) fn get(&self, location: &str) -> InfodemicResult<Vec<u8>> {
        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                log::debug!("GET {url}");
                let body = self
                    .client
                    .get(url)
                    .send()?
                    .error_for_status()?
                    .bytes()?;

                Ok(body.to_vec())
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| {
                    InfodemicError::other(format!("invalid file url {url}"))
                })?;

                read(&path)
            }
            Ok(url) if url.scheme().len() > 1 => {
                bail!("unsupported scheme {}", url.scheme())
            }
            // Relative paths and Windows drive letters.
            _ => read(&self.base_dir.join(location)),
        }
    }
}

fn read(path: &Path) -> InfodemicResult<Vec<u8>> {
    log::debug!("reading {}", path.display());
    fs::read(path).map_err(|e| {
        InfodemicError::other(format!("{}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn is_remote() {
        assert!(Fetcher::is_remote("https://api.biorxiv.org/details"));
        assert!(Fetcher::is_remote("http://localhost:8080/x.csv"));
        assert!(!Fetcher::is_remote("file:///tmp/x.csv"));
        assert!(!Fetcher::is_remote("snapshots/x.csv"));
    }

    #[test]
    fn get_relative_and_file_url() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("trends.csv"), "2021-01-01,5\n")?;

        let fetcher = Fetcher::new(dir.path())?;
        assert_eq!(fetcher.get("trends.csv")?, b"2021-01-01,5\n");

        let url = Url::from_file_path(dir.path().join("trends.csv"))
            .map_err(|_| anyhow::anyhow!("file url"))?;
        assert_eq!(fetcher.get(url.as_str())?, b"2021-01-01,5\n");
        Ok(())
    }

    #[test]
    fn get_missing_file_names_path() -> TestResult {
        let dir = tempfile::tempdir()?;
        let fetcher = Fetcher::new(dir.path())?;
        let err = fetcher.get("missing.csv").unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
        Ok(())
    }

    #[test]
    fn get_unsupported_scheme() -> TestResult {
        let fetcher = Fetcher::new(".")?;
        assert!(fetcher.get("ftp://example.org/x.csv").is_err());
        Ok(())
    }
}

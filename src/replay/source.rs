//! Where a historical transcript comes from.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::ReplayError;

/// A readable transcript location.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Read the whole transcript.
    async fn fetch(&self) -> Result<String, ReplayError>;

    /// The location, for logs and errors.
    fn location(&self) -> String;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TranscriptSource for FileSource {
    async fn fetch(&self) -> Result<String, ReplayError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ReplayError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TranscriptSource for HttpSource {
    async fn fetch(&self) -> Result<String, ReplayError> {
        debug!("GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplayError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// `http://` and `https://` locations are fetched over the network,
/// anything else is a local path.
pub fn source_for(location: &str) -> Box<dyn TranscriptSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}

/// Fetch with an upper bound on time, giving up early when `cancel` fires.
pub async fn fetch_transcript(
    source: &dyn TranscriptSource,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<String, ReplayError> {
    let location = source.location();
    info!("Fetching transcript from {}", location);

    let contents = tokio::select! {
        _ = cancel.cancelled() => return Err(ReplayError::Cancelled(location)),
        fetched = tokio::time::timeout(timeout, source.fetch()) => match fetched {
            Ok(result) => result?,
            Err(_) => {
                return Err(ReplayError::Timeout {
                    location,
                    seconds: timeout.as_secs(),
                })
            }
        },
    };

    info!("Fetched {} bytes from {}", contents.len(), location);
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct SlowSource;

    #[async_trait]
    impl TranscriptSource for SlowSource {
        async fn fetch(&self) -> Result<String, ReplayError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }

        fn location(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn test_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "12:00 <al> #startmeeting").unwrap();

        let source = FileSource::new(file.path());
        let contents = fetch_transcript(&source, Duration::from_secs(5), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(contents, "12:00 <al> #startmeeting\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSource::new("/nonexistent/dev.log.txt");
        let result = fetch_transcript(&source, Duration::from_secs(5), &CancellationToken::new()).await;
        assert!(matches!(result, Err(ReplayError::Io { .. })));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let result =
            fetch_transcript(&SlowSource, Duration::from_millis(20), &CancellationToken::new()).await;
        assert!(matches!(result, Err(ReplayError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_fetch_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = fetch_transcript(&SlowSource, Duration::from_secs(5), &cancel).await;
        assert!(matches!(result, Err(ReplayError::Cancelled(_))));
    }

    #[test]
    fn test_source_for_picks_by_scheme() {
        assert_eq!(
            source_for("https://example.org/dev.log.txt").location(),
            "https://example.org/dev.log.txt"
        );
        assert_eq!(source_for("logs/dev.log.txt").location(), "logs/dev.log.txt");
    }
}

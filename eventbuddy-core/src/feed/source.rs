//! Feed byte sources.
//!
//! Transport is the source's concern; the syncer only ever sees decoded
//! envelopes. A network-backed source slots in by implementing [`FeedSource`].

use std::path::PathBuf;

use crate::error::SyncError;

/// Supplies the raw bytes of a feed document.
pub trait FeedSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>, SyncError>>;
}

/// Feed bundled with the application or dropped on disk.
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileFeed { path: path.into() }
    }
}

impl FeedSource for FileFeed {
    async fn fetch(&self) -> Result<Vec<u8>, SyncError> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            SyncError::FeedUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_feed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"events\":[]}").unwrap();

        let source = FileFeed::new(file.path());
        let bytes = source.fetch().await.expect("should read");
        assert_eq!(bytes, b"{\"events\":[]}");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let source = FileFeed::new("/nonexistent/feed.json");
        assert!(matches!(
            source.fetch().await,
            Err(SyncError::FeedUnavailable(_))
        ));
    }
}

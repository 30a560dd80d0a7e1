//! Local file fetching

use super::traits::{MediaFetcher, MediaResource, SourceError};
use async_trait::async_trait;

/// Reads media from the local filesystem
///
/// Accepts plain paths and `file://` URLs. Other schemes are rejected with
/// [`SourceError::Fetch`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

#[async_trait]
impl MediaFetcher for FileFetcher {
    async fn fetch_bytes(&self, resource: &MediaResource) -> Result<Vec<u8>, SourceError> {
        let path = resource
            .to_local_path()
            .ok_or_else(|| SourceError::Fetch(format!("Unsupported locator: {}", resource)))?;

        let bytes = tokio::fs::read(&path).await?;
        tracing::debug!("Fetched {} bytes from {:?}", bytes.len(), path);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_fetch_local_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"not really a video")?;

        let resource = MediaResource::new(file.path().to_string_lossy());
        let bytes = FileFetcher.fetch_bytes(&resource).await?;

        assert_eq!(bytes, b"not really a video");
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let resource = MediaResource::new("/definitely/not/here.mp4");
        let result = FileFetcher.fetch_bytes(&resource).await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn test_fetch_remote_rejected() {
        let resource = MediaResource::new("https://example.com/clip.mp4");
        let result = FileFetcher.fetch_bytes(&resource).await;
        assert!(matches!(result, Err(SourceError::Fetch(_))));
    }
}

//! Streaming binary download with progress tracking
//!
//! The response body is streamed straight to disk in fixed-size chunks.
//! After every chunk the caller's progress callback runs with the updated
//! [`DownloadProgress`], provided the server advertised a content length.
//! There is no retry and no resume: a failed transfer fails the session.

use futures_util::StreamExt;
use keymaster_core::source::build_client;
use keymaster_core::types::NetworkConfig;
use keymaster_core::{DownloadProgress, Error, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default chunk size for writing and progress reporting (8 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Streams a remote file to a local path
#[derive(Debug, Clone)]
pub struct Downloader {
    /// HTTP client
    client: reqwest::Client,

    /// Bytes written per progress step
    chunk_size: usize,
}

impl Downloader {
    /// Create a downloader from network settings
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(network)?,
            chunk_size: network.download_chunk_size.max(1),
        })
    }

    /// Create a downloader around an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Download `url` into `dest`, creating or truncating it.
    ///
    /// `on_progress` is called after each chunk when the length is known and
    /// must not block; hosts marshal it onto their UI thread themselves.
    pub async fn fetch<F>(
        &self,
        url: &str,
        dest: &Path,
        mut on_progress: F,
    ) -> Result<DownloadProgress>
    where
        F: FnMut(&DownloadProgress) + Send,
    {
        info!("Downloading {} to {}", url, dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Failed to send download request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let total_bytes = response.content_length().unwrap_or(0);
        let mut progress = DownloadProgress::new(total_bytes);
        debug!("Advertised length: {} bytes", total_bytes);

        let mut file = File::create(dest)
            .await
            .map_err(|e| Error::file_system(dest, e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result
                .map_err(|e| Error::network(format!("Failed to read download chunk: {}", e)))?;

            for piece in chunk.chunks(self.chunk_size) {
                file.write_all(piece)
                    .await
                    .map_err(|e| Error::file_system(dest, e))?;

                downloaded += piece.len() as u64;
                progress.update(downloaded);

                if progress.is_determinate() {
                    on_progress(&progress);
                }
            }
        }

        file.flush().await.map_err(|e| Error::file_system(dest, e))?;
        file.sync_all()
            .await
            .map_err(|e| Error::file_system(dest, e))?;

        info!("Downloaded {}", human_readable_size(downloaded));
        Ok(progress)
    }
}

/// Convert bytes to human-readable size
fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable_size(0), "0.00 B");
        assert_eq!(human_readable_size(1023), "1023.00 B");
        assert_eq!(human_readable_size(1024), "1.00 KB");
        assert_eq!(human_readable_size(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn test_chunk_size_from_config() {
        let network = NetworkConfig {
            download_chunk_size: 0,
            ..NetworkConfig::default()
        };
        let downloader = Downloader::new(&network).unwrap();
        assert_eq!(downloader.chunk_size(), 1);

        let downloader = Downloader::new(&NetworkConfig::default()).unwrap();
        assert_eq!(downloader.chunk_size(), DEFAULT_CHUNK_SIZE);
    }
}

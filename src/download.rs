//! Streamed downloads with progress reporting.

use std::future::Future;
use std::path::Path;

use bytes::BytesMut;
use futures_util::StreamExt;
use reqwest::Response;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::Result;

/// Tracks cumulative progress of one download.
///
/// Percentages are only produced when the total size is known and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTracker {
    total: Option<u64>,
    downloaded: u64,
}

impl ProgressTracker {
    /// Create a tracker for a body of `total` bytes, if known.
    pub fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            downloaded: 0,
        }
    }

    /// Record `bytes` more and return the cumulative percentage (0-100).
    pub fn advance(&mut self, bytes: u64) -> Option<f64> {
        self.downloaded += bytes;
        self.total
            .map(|total| (self.downloaded as f64 / total as f64 * 100.0).min(100.0))
    }

    /// Bytes seen so far.
    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }
}

/// Write a response body to `dest` in increments of `chunk_size` bytes.
///
/// After every increment the optional callback is awaited with the
/// cumulative percentage, before the next increment is read. Returns the
/// number of bytes written.
pub(crate) async fn stream_to_file<F, Fut>(
    response: Response,
    dest: &Path,
    chunk_size: usize,
    mut progress: Option<F>,
) -> Result<u64>
where
    F: FnMut(f64) -> Fut,
    Fut: Future<Output = ()>,
{
    let chunk_size = chunk_size.max(1);
    let mut tracker = ProgressTracker::new(response.content_length());

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .await?;

    let mut stream = response.bytes_stream();
    let mut pending = BytesMut::with_capacity(chunk_size);

    while let Some(piece) = stream.next().await {
        pending.extend_from_slice(&piece?);
        while pending.len() >= chunk_size {
            let chunk = pending.split_to(chunk_size);
            write_increment(&mut file, &chunk, &mut tracker, &mut progress).await?;
        }
    }
    if !pending.is_empty() {
        write_increment(&mut file, &pending, &mut tracker, &mut progress).await?;
    }

    file.flush().await?;

    info!(
        dest = %dest.display(),
        size = tracker.downloaded(),
        "Download complete"
    );

    Ok(tracker.downloaded())
}

async fn write_increment<F, Fut>(
    file: &mut File,
    chunk: &[u8],
    tracker: &mut ProgressTracker,
    progress: &mut Option<F>,
) -> Result<()>
where
    F: FnMut(f64) -> Fut,
    Fut: Future<Output = ()>,
{
    file.write_all(chunk).await?;

    if let Some(percent) = tracker.advance(chunk.len() as u64) {
        if let Some(callback) = progress.as_mut() {
            callback(percent).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reaches_100() {
        let mut tracker = ProgressTracker::new(Some(20_000));
        let mut seen = Vec::new();
        for step in [8192, 8192, 3616] {
            seen.extend(tracker.advance(step));
        }

        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100.0);
        assert_eq!(tracker.downloaded(), 20_000);
    }

    #[test]
    fn test_no_progress_without_length() {
        let mut tracker = ProgressTracker::new(None);
        assert_eq!(tracker.advance(10), None);

        let mut zero = ProgressTracker::new(Some(0));
        assert_eq!(zero.advance(10), None);
        assert_eq!(zero.downloaded(), 10);
    }

    #[test]
    fn test_progress_clamped() {
        let mut tracker = ProgressTracker::new(Some(10));
        assert_eq!(tracker.advance(25), Some(100.0));
    }
}

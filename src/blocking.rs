//! Blocking ZeroGallery client.
//!
//! [`BlockingGalleryClient`] runs every [`GalleryClient`] operation to
//! completion on a single-threaded Tokio runtime that it owns. The runtime
//! is created on the first call and shut down when the client is dropped.

use std::cell::OnceCell;
use std::future::{self, Future};
use std::path::Path;

use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{GalleryError, Result};
use crate::gallery::GalleryClient;
use crate::models::{Album, CreateAlbumRequest, DataItem, VideoChunk};

/// Blocking wrapper around [`GalleryClient`].
///
/// The client is `Send` but not `Sync`: calls are serialized through one
/// runtime, so share it between threads only behind a lock. Do not create
/// or drop it from inside an async context.
///
/// # Example
///
/// ```rust,no_run
/// use zerogallery::{BlockingGalleryClient, CreateAlbumRequest};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = BlockingGalleryClient::with_token("http://localhost:5000", "secret")?;
///     let album = client.create_album(&CreateAlbumRequest::new("Sync album"))?;
///     let id = client.upload_file("photo.jpg", Some(album.id))?;
///     client.download_data(id, "photo-copy.jpg")?;
///     client.delete_data(id)?;
///     client.delete_album(album.id)?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct BlockingGalleryClient {
    inner: GalleryClient,
    runtime: OnceCell<Runtime>,
}

impl BlockingGalleryClient {
    /// Create a client for `base_url` without an access token.
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self> {
        Ok(Self::from_async(GalleryClient::new(base_url)?))
    }

    /// Create a client that sends `token` with every request.
    pub fn with_token<S1: Into<String>, S2: Into<String>>(base_url: S1, token: S2) -> Result<Self> {
        Ok(Self::from_async(GalleryClient::with_token(base_url, token)?))
    }

    /// Create a client from a full configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_async(GalleryClient::with_config(config)?))
    }

    /// Wrap an existing async client.
    pub fn from_async(inner: GalleryClient) -> Self {
        Self {
            inner,
            runtime: OnceCell::new(),
        }
    }

    /// The wrapped async client.
    pub fn as_async(&self) -> &GalleryClient {
        &self.inner
    }

    /// Whether the runtime has been started.
    pub fn has_runtime(&self) -> bool {
        self.runtime.get().is_some()
    }

    fn runtime(&self) -> Result<&Runtime> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime);
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| GalleryError::Runtime(format!("Failed to create runtime: {}", e)))?;
        debug!("Started blocking client runtime");
        Ok(self.runtime.get_or_init(|| runtime))
    }

    fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.runtime()?.block_on(fut)
    }

    // ==================
    // SESSION
    // ==================

    /// Replace the access token for subsequent requests.
    pub fn set_access_token(&self, token: Option<&str>) -> Result<()> {
        self.inner.set_access_token(token)
    }

    /// Open the connection pool now instead of on the first request.
    pub fn open(&self) -> Result<()> {
        self.inner.open()
    }

    /// Release the connection pool. The next request opens a new one.
    pub fn close(&self) {
        self.inner.close()
    }

    // ==================
    // OPERATIONS
    // ==================

    /// See [`GalleryClient::get_version`].
    pub fn get_version(&self) -> Result<String> {
        self.run(self.inner.get_version())
    }

    /// See [`GalleryClient::get_albums`].
    pub fn get_albums(&self) -> Result<Vec<Album>> {
        self.run(self.inner.get_albums())
    }

    /// See [`GalleryClient::create_album`].
    pub fn create_album(&self, request: &CreateAlbumRequest) -> Result<Album> {
        self.run(self.inner.create_album(request))
    }

    /// See [`GalleryClient::delete_album`].
    pub fn delete_album(&self, album_id: i64) -> Result<()> {
        self.run(self.inner.delete_album(album_id))
    }

    /// See [`GalleryClient::get_data_without_albums`].
    pub fn get_data_without_albums(&self) -> Result<Vec<DataItem>> {
        self.run(self.inner.get_data_without_albums())
    }

    /// See [`GalleryClient::get_album_data`].
    pub fn get_album_data(&self, album_id: i64) -> Result<Vec<DataItem>> {
        self.run(self.inner.get_album_data(album_id))
    }

    /// See [`GalleryClient::upload_file`].
    pub fn upload_file<P: AsRef<Path>>(&self, file_path: P, album_id: Option<i64>) -> Result<i64> {
        self.run(self.inner.upload_file(file_path, album_id))
    }

    /// See [`GalleryClient::upload_file_data`].
    pub fn upload_file_data<B: Into<Vec<u8>>>(
        &self,
        data: B,
        filename: &str,
        album_id: Option<i64>,
    ) -> Result<i64> {
        self.run(self.inner.upload_file_data(data, filename, album_id))
    }

    /// See [`GalleryClient::upload_multiple_files`].
    pub fn upload_multiple_files<P: AsRef<Path>>(
        &self,
        file_paths: &[P],
        album_id: Option<i64>,
    ) -> Result<Vec<i64>> {
        self.run(self.inner.upload_multiple_files(file_paths, album_id))
    }

    /// See [`GalleryClient::get_preview`].
    pub fn get_preview(&self, data_id: i64) -> Result<Bytes> {
        self.run(self.inner.get_preview(data_id))
    }

    /// See [`GalleryClient::save_preview`].
    pub fn save_preview<P: AsRef<Path>>(&self, data_id: i64, output_path: P) -> Result<()> {
        self.run(self.inner.save_preview(data_id, output_path))
    }

    /// See [`GalleryClient::get_data`].
    pub fn get_data(&self, data_id: i64) -> Result<Bytes> {
        self.run(self.inner.get_data(data_id))
    }

    /// See [`GalleryClient::download_data`].
    pub fn download_data<P: AsRef<Path>>(&self, data_id: i64, dest: P) -> Result<u64> {
        self.run(self.inner.download_data(data_id, dest))
    }

    /// See [`GalleryClient::download_data_with_progress`].
    ///
    /// The callback runs on the calling thread between increments.
    pub fn download_data_with_progress<P, F>(
        &self,
        data_id: i64,
        dest: P,
        chunk_size: Option<usize>,
        mut progress: F,
    ) -> Result<u64>
    where
        P: AsRef<Path>,
        F: FnMut(f64),
    {
        self.run(
            self.inner
                .download_data_with_progress(data_id, dest, chunk_size, |percent| {
                    progress(percent);
                    future::ready(())
                }),
        )
    }

    /// See [`GalleryClient::get_video_stream`].
    pub fn get_video_stream(
        &self,
        data_id: i64,
        range_start: Option<u64>,
        range_end: Option<u64>,
    ) -> Result<VideoChunk> {
        self.run(self.inner.get_video_stream(data_id, range_start, range_end))
    }

    /// See [`GalleryClient::delete_data`].
    pub fn delete_data(&self, data_id: i64) -> Result<()> {
        self.run(self.inner.delete_data(data_id))
    }
}

impl Drop for BlockingGalleryClient {
    fn drop(&mut self) {
        self.inner.close();
        if self.runtime.take().is_some() {
            debug!("Stopped blocking client runtime");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_is_lazy() {
        let client = BlockingGalleryClient::new("http://localhost:5000").unwrap();
        assert!(!client.has_runtime());
        client.runtime().unwrap();
        assert!(client.has_runtime());
    }

    #[test]
    fn test_empty_upload_skips_runtime_work() {
        let client = BlockingGalleryClient::new("http://localhost:5000").unwrap();
        let files: [&str; 0] = [];
        assert!(client.upload_multiple_files(&files, None).unwrap().is_empty());
        assert!(!client.as_async().is_open());
    }
}

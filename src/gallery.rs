//! Asynchronous ZeroGallery client.
//!
//! This module provides [`GalleryClient`], which wraps every endpoint of the
//! gallery service: albums, data items, uploads, previews, streamed
//! downloads and ranged reads.

use std::future::{self, Future};
use std::ops::Deref;
use std::path::Path;

use bytes::Bytes;
use reqwest::header::{HeaderName, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use serde_json::Value;
use tracing::{debug, info};

use crate::api::{ByteRange, Payload, Session};
use crate::config::ClientConfig;
use crate::converters;
use crate::download;
use crate::error::{GalleryError, Result};
use crate::models::{Album, CreateAlbumRequest, DataItem, VideoChunk};

/// Multipart field for a single-file upload.
const SINGLE_FILE_FIELD: &str = "file";

/// Multipart field repeated for each file of a multi-file upload.
const MULTI_FILE_FIELD: &str = "files";

/// Asynchronous client for the ZeroGallery API.
///
/// One client holds one connection pool, opened on the first request.
/// Calls may be issued concurrently from several tasks; each is an
/// independent request over the shared pool.
///
/// # Example
///
/// ```rust,no_run
/// use zerogallery::{CreateAlbumRequest, GalleryClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = GalleryClient::with_token("http://localhost:5000", "secret")?;
///     let scope = client.scope()?;
///
///     let album = scope
///         .create_album(&CreateAlbumRequest::new("Trips").with_description("2024"))
///         .await?;
///     let id = scope.upload_file("beach.jpg", Some(album.id)).await?;
///     scope
///         .download_data_with_progress(id, "copy.jpg", None, |percent| async move {
///             println!("{:.1}%", percent);
///         })
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct GalleryClient {
    session: Session,
    chunk_size: usize,
}

impl GalleryClient {
    /// Create a client for `base_url` without an access token.
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client that sends `token` with every request.
    pub fn with_token<S1: Into<String>, S2: Into<String>>(base_url: S1, token: S2) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url).with_token(token))
    }

    /// Create a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for an empty or non-http(s) base URL and
    /// `InvalidToken` for a token that cannot be sent as a header.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let session = Session::new(&config)?;
        Ok(Self {
            session,
            chunk_size: config.chunk_size.max(1),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// Replace the access token for subsequent requests.
    ///
    /// `None` or an empty string stops sending the header.
    pub fn set_access_token(&self, token: Option<&str>) -> Result<()> {
        self.session.set_access_token(token)
    }

    /// Whether a token is attached to outgoing requests.
    pub fn has_access_token(&self) -> bool {
        self.session.has_access_token()
    }

    /// Open the connection pool now instead of on the first request.
    pub fn open(&self) -> Result<()> {
        self.session.open()
    }

    /// Whether the connection pool is open.
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Release the connection pool. The next request opens a new one.
    pub fn close(&self) {
        self.session.close()
    }

    /// Open the session and return a guard that closes it when dropped.
    ///
    /// The guard dereferences to the client, so it can be used in its place
    /// for the duration of a block, including early returns through `?`.
    pub fn scope(&self) -> Result<SessionScope<'_>> {
        self.open()?;
        Ok(SessionScope { client: self })
    }

    // ==================
    // SERVICE
    // ==================

    /// Get the API version string.
    pub async fn get_version(&self) -> Result<String> {
        let body = self.session.request(Method::GET, "api/version", Payload::Empty).await?;
        Ok(body.into_text().trim().to_string())
    }

    // ==================
    // ALBUMS
    // ==================

    /// List albums in service order.
    pub async fn get_albums(&self) -> Result<Vec<Album>> {
        let json = self.get_json("api/albums").await?;
        converters::parse_albums(&json)
    }

    /// Create an album and return it as stored by the service.
    pub async fn create_album(&self, request: &CreateAlbumRequest) -> Result<Album> {
        let body = serde_json::to_value(request)?;
        let json = self
            .session
            .request(Method::POST, "api/album", Payload::Json(body))
            .await?
            .into_json()?;
        let album = converters::parse_album(&json)?;
        info!(album_id = album.id, protected = album.is_protected, "Album created");
        Ok(album)
    }

    /// Delete an album. A missing album surfaces as `NotFound`.
    pub async fn delete_album(&self, album_id: i64) -> Result<()> {
        self.session
            .request(Method::DELETE, &format!("api/album/{}", album_id), Payload::Empty)
            .await?;
        info!(album_id, "Album deleted");
        Ok(())
    }

    // ==================
    // DATA
    // ==================

    /// List items that belong to no album.
    pub async fn get_data_without_albums(&self) -> Result<Vec<DataItem>> {
        let json = self.get_json("api/data").await?;
        converters::parse_data_items(&json)
    }

    /// List items of an album.
    pub async fn get_album_data(&self, album_id: i64) -> Result<Vec<DataItem>> {
        let json = self.get_json(&format!("api/album/{}/data", album_id)).await?;
        converters::parse_data_items(&json)
    }

    /// Fetch the preview image of an item.
    pub async fn get_preview(&self, data_id: i64) -> Result<Bytes> {
        let body = self
            .session
            .request(Method::GET, &format!("api/preview/{}", data_id), Payload::Empty)
            .await?;
        Ok(body.into_bytes())
    }

    /// Fetch the preview image of an item and write it to `output_path`.
    pub async fn save_preview<P: AsRef<Path>>(&self, data_id: i64, output_path: P) -> Result<()> {
        let data = self.get_preview(data_id).await?;
        tokio::fs::write(output_path.as_ref(), &data).await?;
        debug!(data_id, path = %output_path.as_ref().display(), "Preview saved");
        Ok(())
    }

    /// Fetch the full content of an item into memory.
    pub async fn get_data(&self, data_id: i64) -> Result<Bytes> {
        let body = self
            .session
            .request(Method::GET, &data_path(data_id), Payload::Empty)
            .await?;
        Ok(body.into_bytes())
    }

    /// Delete an item. A missing item surfaces as `NotFound`.
    pub async fn delete_data(&self, data_id: i64) -> Result<()> {
        self.session
            .request(Method::DELETE, &data_path(data_id), Payload::Empty)
            .await?;
        info!(data_id, "Data deleted");
        Ok(())
    }

    // ==================
    // UPLOADS
    // ==================

    /// Upload a local file, optionally into an album.
    ///
    /// Album IDs `<= 0` are treated as "no album".
    pub async fn upload_file<P: AsRef<Path>>(&self, file_path: P, album_id: Option<i64>) -> Result<i64> {
        let (name, contents) = read_upload(file_path.as_ref()).await?;
        self.upload_file_data(contents, &name, album_id).await
    }

    /// Upload an in-memory buffer under `filename`.
    pub async fn upload_file_data<B: Into<Vec<u8>>>(
        &self,
        data: B,
        filename: &str,
        album_id: Option<i64>,
    ) -> Result<i64> {
        let data = data.into();
        let size = data.len();
        let part = Part::bytes(data).file_name(filename.to_string());
        let form = Form::new().part(SINGLE_FILE_FIELD, part);

        let path = upload_path(album_id);
        let json = self
            .session
            .request(Method::POST, &path, Payload::Multipart(form))
            .await?
            .into_json()?;
        let id = converters::parse_id(&json)?;

        info!(data_id = id, file = %filename, size, "File uploaded");
        Ok(id)
    }

    /// Upload several local files in one multipart request.
    ///
    /// Returns one ID per file, in input order. An empty list returns an
    /// empty result without contacting the service. Any failure aborts the
    /// whole request.
    pub async fn upload_multiple_files<P: AsRef<Path>>(
        &self,
        file_paths: &[P],
        album_id: Option<i64>,
    ) -> Result<Vec<i64>> {
        if file_paths.is_empty() {
            debug!("No files to upload");
            return Ok(Vec::new());
        }

        let mut form = Form::new();
        for file_path in file_paths {
            let (name, contents) = read_upload(file_path.as_ref()).await?;
            form = form.part(MULTI_FILE_FIELD, Part::bytes(contents).file_name(name));
        }

        let path = upload_path(album_id);
        let json = self
            .session
            .request(Method::POST, &path, Payload::Multipart(form))
            .await?
            .into_json()?;
        let ids = converters::parse_ids(&json)?;

        if ids.len() != file_paths.len() {
            return Err(GalleryError::InvalidResponse(format!(
                "uploaded {} files but received {} IDs",
                file_paths.len(),
                ids.len()
            )));
        }

        info!(count = ids.len(), "Files uploaded");
        Ok(ids)
    }

    // ==================
    // STREAMING
    // ==================

    /// Download an item to `dest` using the configured chunk size.
    ///
    /// Returns the number of bytes written.
    pub async fn download_data<P: AsRef<Path>>(&self, data_id: i64, dest: P) -> Result<u64> {
        let response = self.open_data_stream(data_id, None).await?;
        download::stream_to_file(
            response,
            dest.as_ref(),
            self.chunk_size,
            None::<fn(f64) -> future::Ready<()>>,
        )
        .await
    }

    /// Download an item to `dest`, reporting progress after each increment.
    ///
    /// `progress` receives the cumulative percentage (0-100) and is awaited
    /// before the next increment is read. It is never called when the
    /// service does not report a content length. `chunk_size` falls back to
    /// the configured value.
    pub async fn download_data_with_progress<P, F, Fut>(
        &self,
        data_id: i64,
        dest: P,
        chunk_size: Option<usize>,
        progress: F,
    ) -> Result<u64>
    where
        P: AsRef<Path>,
        F: FnMut(f64) -> Fut,
        Fut: Future<Output = ()>,
    {
        let response = self.open_data_stream(data_id, None).await?;
        download::stream_to_file(
            response,
            dest.as_ref(),
            chunk_size.unwrap_or(self.chunk_size),
            Some(progress),
        )
        .await
    }

    /// Read a byte range of an item, typically a video.
    ///
    /// With no bounds the whole item is returned. A 206 response is a
    /// success like any other 2xx; see [`VideoChunk::is_partial`].
    pub async fn get_video_stream(
        &self,
        data_id: i64,
        range_start: Option<u64>,
        range_end: Option<u64>,
    ) -> Result<VideoChunk> {
        let range = ByteRange::from_bounds(range_start, range_end);
        let response = self.open_data_stream(data_id, range).await?;

        let status = response.status().as_u16();
        let content_range = header_string(&response, CONTENT_RANGE);
        let content_length = header_string(&response, CONTENT_LENGTH);
        let content_type = header_string(&response, CONTENT_TYPE);
        let data = response.bytes().await?;

        debug!(data_id, status, len = data.len(), range = %content_range, "Ranged read");

        Ok(VideoChunk {
            data,
            content_range,
            content_length,
            content_type,
            status,
        })
    }

    // ==================
    // INTERNAL HELPERS
    // ==================

    async fn get_json(&self, path: &str) -> Result<Value> {
        self.session
            .request(Method::GET, path, Payload::Empty)
            .await?
            .into_json()
    }

    async fn open_data_stream(&self, data_id: i64, range: Option<ByteRange>) -> Result<Response> {
        self.session
            .send(Method::GET, &data_path(data_id), Payload::Empty, range)
            .await
    }
}

/// Guard returned by [`GalleryClient::scope`]; closes the session on drop.
#[derive(Debug)]
pub struct SessionScope<'a> {
    client: &'a GalleryClient,
}

impl Deref for SessionScope<'_> {
    type Target = GalleryClient;

    fn deref(&self) -> &GalleryClient {
        self.client
    }
}

impl Drop for SessionScope<'_> {
    fn drop(&mut self) {
        self.client.close();
    }
}

fn data_path(data_id: i64) -> String {
    format!("api/data/{}", data_id)
}

/// Upload endpoint; non-positive album IDs mean "no album".
fn upload_path(album_id: Option<i64>) -> String {
    match album_id {
        Some(id) if id > 0 => format!("api/upload/{}", id),
        _ => "api/upload".to_string(),
    }
}

/// Read a file for upload, returning its name and contents.
async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            GalleryError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid file name: {}", path.display()),
            ))
        })?
        .to_string();
    let contents = tokio::fs::read(path).await?;
    Ok((name, contents))
}

fn header_string(response: &Response, name: HeaderName) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

//! # ZeroGallery client
//!
//! A Rust client for the ZeroGallery media gallery service.
//!
//! ## Quick Start
//!
//! The easiest way to use this library is through the [`GalleryClient`] struct:
//!
//! ```rust,no_run
//! use zerogallery::{CreateAlbumRequest, GalleryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client with an access token
//!     let client = GalleryClient::with_token("http://localhost:5000", "your-token")?;
//!
//!     // Albums
//!     let album = client
//!         .create_album(&CreateAlbumRequest::new("My album").with_description("Created from Rust"))
//!         .await?;
//!     println!("Created album {} ({})", album.name, album.id);
//!
//!     // Upload and list
//!     let id = client.upload_file("image.jpg", Some(album.id)).await?;
//!     for item in client.get_album_data(album.id).await? {
//!         println!("{} ({})", item.name, item.format_size());
//!     }
//!
//!     // Partial read of a video
//!     let chunk = client.get_video_stream(id, Some(0), Some(1024 * 1024)).await?;
//!     println!("{} bytes, Content-Range: {}", chunk.data.len(), chunk.content_range);
//!
//!     client.delete_data(id).await?;
//!     client.delete_album(album.id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Albums**: list, create (optionally token-protected), delete
//! - **Data items**: list, upload single or multiple files, preview, delete
//! - **Streaming**: chunked downloads with progress and ranged video reads
//! - **Blocking API** via [`BlockingGalleryClient`]
//!
//! ## Low-Level APIs
//!
//! - [`api::Session`] - connection pool and request dispatch
//! - [`converters`] - JSON to model decoding

pub mod api;
mod blocking;
pub mod config;
pub mod converters;
pub mod download;
pub mod error;
mod gallery;
pub mod models;

// Main interface (recommended)
pub use blocking::BlockingGalleryClient;
pub use gallery::{GalleryClient, SessionScope};

pub use api::{ByteRange, ACCESS_TOKEN_HEADER};
pub use config::ClientConfig;
pub use download::ProgressTracker;
pub use error::{GalleryError, Result};
pub use models::{Album, CreateAlbumRequest, DataItem, MediaKind, VideoChunk};

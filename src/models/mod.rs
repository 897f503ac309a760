//! Data models for ZeroGallery API responses.
//!
//! This module contains the album and data item records, the album
//! creation request and the result of a ranged read.

pub mod album;
pub mod common;
pub mod data;

// Re-exports for convenience
pub use album::{Album, CreateAlbumRequest};
pub use common::VideoChunk;
pub use data::{DataItem, MediaKind};

//! Album-related models.
//!
//! This module contains the album record returned by the service and
//! the parameter bundle used to create one.

use serde::{Deserialize, Serialize};

/// An album as reported by the service.
///
/// The client never edits an album in place; re-fetch to see changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Album ID.
    pub id: i64,

    /// ID of the data item used as the album cover.
    pub image_preview_id: i64,

    /// Album name.
    pub name: String,

    /// Album description.
    #[serde(default)]
    pub description: String,

    /// Whether viewing the album requires an access token.
    #[serde(default)]
    pub is_protected: bool,
}

impl Album {
    /// Whether the album has a cover image.
    pub fn has_preview(&self) -> bool {
        self.image_preview_id > 0
    }
}

/// Parameters for creating a new album.
///
/// A non-empty `token` asks the service to protect the album.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    /// Album name (required by the service).
    pub name: String,

    /// Album description.
    #[serde(default)]
    pub description: String,

    /// Protection token; empty means unprotected.
    #[serde(default)]
    pub token: String,

    /// Whether holders of the token may remove data from the album.
    #[serde(default)]
    pub allow_remove_data: bool,
}

impl CreateAlbumRequest {
    /// Create a request with just a name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set description.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Set protection token.
    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = token.into();
        self
    }

    /// Allow token holders to remove data.
    pub fn with_allow_remove_data(mut self, allow: bool) -> Self {
        self.allow_remove_data = allow;
        self
    }
}

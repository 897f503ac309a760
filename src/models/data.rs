//! Data item models.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of a single uploaded file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataItem {
    /// Data item ID.
    pub id: i64,

    /// Owning album ID (non-positive when the item has no album).
    pub album_id: i64,

    /// File size in bytes.
    pub size: i64,

    /// Upload time in milliseconds since the Unix epoch.
    pub created_timestamp: i64,

    /// Display name.
    pub name: String,

    /// File extension.
    #[serde(default)]
    pub extension: String,

    /// Description.
    #[serde(default)]
    pub description: String,

    /// MIME type.
    #[serde(default)]
    pub mime_type: String,

    /// Tags separated by `;`.
    #[serde(default)]
    pub tags: String,
}

/// Coarse media classification derived from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl DataItem {
    /// Upload time as a UTC datetime.
    ///
    /// Out-of-range timestamps fall back to the epoch.
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.created_timestamp)
            .single()
            .unwrap_or_default()
    }

    /// Whether the item belongs to an album.
    pub fn in_album(&self) -> bool {
        self.album_id > 0
    }

    /// Classify the item by MIME type.
    pub fn media_kind(&self) -> MediaKind {
        let mime = self.mime_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    /// Tags as a list, skipping empty entries.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Format the file size in a human readable form.
    pub fn format_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

        if self.size <= 0 {
            return "0 B".to_string();
        }

        let mut size = self.size as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", self.size, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}

//! JSON to model converters.
//!
//! The service speaks camelCase JSON. These functions map raw response
//! values onto the typed records, failing on missing required fields and
//! filling optional ones with their defaults.

use serde_json::Value;

use crate::error::{GalleryError, Result};
use crate::models::{Album, DataItem};

/// Get a required integer field.
fn require_i64(json: &Value, key: &str, entity: &str) -> Result<i64> {
    json.get(key)
        .and_then(as_i64)
        .ok_or_else(|| GalleryError::InvalidResponse(format!("{}: missing or invalid '{}'", entity, key)))
}

/// Get a required string field.
fn require_str(json: &Value, key: &str, entity: &str) -> Result<String> {
    match json.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) => Ok(String::new()),
        _ => Err(GalleryError::InvalidResponse(format!(
            "{}: missing or invalid '{}'",
            entity, key
        ))),
    }
}

/// Get string from JSON, returning empty string if not found or null.
fn get_str(json: &Value, key: &str) -> String {
    json.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Get bool from JSON.
fn get_bool(json: &Value, key: &str) -> bool {
    json.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Integer from a number or a numeric string.
fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an album from raw JSON.
pub fn parse_album(json: &Value) -> Result<Album> {
    if !json.is_object() {
        return Err(GalleryError::InvalidResponse(format!(
            "album: expected object, got {}",
            json
        )));
    }

    Ok(Album {
        id: require_i64(json, "id", "album")?,
        image_preview_id: require_i64(json, "imagePreviewId", "album")?,
        name: require_str(json, "name", "album")?,
        description: get_str(json, "description"),
        is_protected: get_bool(json, "isProtected"),
    })
}

/// Parse a data item from raw JSON.
pub fn parse_data_item(json: &Value) -> Result<DataItem> {
    if !json.is_object() {
        return Err(GalleryError::InvalidResponse(format!(
            "data item: expected object, got {}",
            json
        )));
    }

    Ok(DataItem {
        id: require_i64(json, "id", "data item")?,
        album_id: require_i64(json, "albumId", "data item")?,
        size: require_i64(json, "size", "data item")?,
        created_timestamp: require_i64(json, "createdTimestamp", "data item")?,
        name: require_str(json, "name", "data item")?,
        extension: get_str(json, "extension"),
        description: get_str(json, "description"),
        mime_type: get_str(json, "mimeType"),
        tags: get_str(json, "tags"),
    })
}

/// Parse a JSON array of albums, preserving service order.
pub fn parse_albums(json: &Value) -> Result<Vec<Album>> {
    as_array(json, "albums")?.iter().map(parse_album).collect()
}

/// Parse a JSON array of data items, preserving service order.
pub fn parse_data_items(json: &Value) -> Result<Vec<DataItem>> {
    as_array(json, "data items")?
        .iter()
        .map(parse_data_item)
        .collect()
}

/// Parse the ID returned by a single-file upload.
pub fn parse_id(json: &Value) -> Result<i64> {
    as_i64(json)
        .ok_or_else(|| GalleryError::InvalidResponse(format!("expected data ID, got {}", json)))
}

/// Parse the IDs returned by a multi-file upload.
///
/// The service answers with a bare ID when only one file was sent.
pub fn parse_ids(json: &Value) -> Result<Vec<i64>> {
    match json {
        Value::Array(items) => items.iter().map(parse_id).collect(),
        other => parse_id(other).map(|id| vec![id]),
    }
}

fn as_array<'a>(json: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    json.as_array()
        .ok_or_else(|| GalleryError::InvalidResponse(format!("{}: expected array, got {}", what, json)))
}

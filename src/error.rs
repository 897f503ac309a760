//! Error types for the ZeroGallery client.

use thiserror::Error;

/// Main error type for all gallery operations.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The service answered 401 for the given path.
    #[error("Unauthorized access: {0}")]
    Unauthorized(String),

    /// The service answered 404 for the given path.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// HTTP transport failed.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// JSON was well formed but not the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Base URL is empty or not http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Access token cannot be sent as a header value.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// The blocking client could not start its runtime.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl GalleryError {
    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            GalleryError::Unauthorized(_) => Some(401),
            GalleryError::NotFound(_) => Some(404),
            GalleryError::Http { status, .. } => Some(*status),
            GalleryError::RequestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for gallery operations.
pub type Result<T> = std::result::Result<T, GalleryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GalleryError::Unauthorized("api/albums".into()).status(), Some(401));
        assert_eq!(GalleryError::NotFound("api/data/1".into()).status(), Some(404));
        let http = GalleryError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(http.status(), Some(500));
        assert_eq!(GalleryError::InvalidUrl("x".into()).status(), None);
    }

    #[test]
    fn test_display_carries_path() {
        let err = GalleryError::NotFound("api/album/7".to_string());
        assert_eq!(err.to_string(), "Resource not found: api/album/7");
    }
}

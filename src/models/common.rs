//! Types shared by the data operations.

use bytes::Bytes;

/// Payload and headers of a ranged read.
///
/// Header fields are empty strings when the service did not send them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoChunk {
    /// Body bytes.
    pub data: Bytes,
    /// `Content-Range` response header.
    pub content_range: String,
    /// `Content-Length` response header.
    pub content_length: String,
    /// `Content-Type` response header.
    pub content_type: String,
    /// HTTP status of the response.
    pub status: u16,
}

impl VideoChunk {
    /// Whether the service answered with 206 Partial Content.
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }

    /// Total resource size parsed from `Content-Range` (`bytes a-b/total`).
    pub fn total_size(&self) -> Option<u64> {
        self.content_range
            .rsplit_once('/')
            .and_then(|(_, total)| total.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_size() {
        let chunk = VideoChunk {
            content_range: "bytes 0-1023/4096".to_string(),
            status: 206,
            ..Default::default()
        };
        assert!(chunk.is_partial());
        assert_eq!(chunk.total_size(), Some(4096));
    }

    #[test]
    fn test_total_size_unknown() {
        let chunk = VideoChunk {
            content_range: "bytes 0-1023/*".to_string(),
            ..Default::default()
        };
        assert_eq!(chunk.total_size(), None);
        assert_eq!(VideoChunk::default().total_size(), None);
    }
}

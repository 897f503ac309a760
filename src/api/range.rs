//! `Range` request header construction.

use std::fmt;

/// A byte range in the form accepted by the `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end`, both inclusive.
    Bounded { start: u64, end: u64 },
    /// `bytes=start-`, from `start` to the end of the resource.
    From { start: u64 },
    /// `bytes=-len`, the last `len` bytes.
    Suffix { len: u64 },
}

impl ByteRange {
    /// Build a range from optional bounds. Returns `None` when both are absent.
    pub fn from_bounds(start: Option<u64>, end: Option<u64>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(ByteRange::Bounded { start, end }),
            (Some(start), None) => Some(ByteRange::From { start }),
            (None, Some(len)) => Some(ByteRange::Suffix { len }),
            (None, None) => None,
        }
    }

    /// Header value, e.g. `bytes=0-1023`.
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteRange::Bounded { start, end } => write!(f, "bytes={}-{}", start, end),
            ByteRange::From { start } => write!(f, "bytes={}-", start),
            ByteRange::Suffix { len } => write!(f, "bytes=-{}", len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        let range = ByteRange::from_bounds(Some(0), Some(1_048_575)).unwrap();
        assert_eq!(range.header_value(), "bytes=0-1048575");
    }

    #[test]
    fn test_open_ended() {
        let range = ByteRange::from_bounds(Some(100), None).unwrap();
        assert_eq!(range.header_value(), "bytes=100-");
    }

    #[test]
    fn test_suffix() {
        let range = ByteRange::from_bounds(None, Some(500)).unwrap();
        assert_eq!(range.header_value(), "bytes=-500");
    }

    #[test]
    fn test_no_bounds() {
        assert_eq!(ByteRange::from_bounds(None, None), None);
    }
}

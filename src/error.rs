//! Error types for payload checksumming

use std::fmt;
use std::io;

use crate::tags::TagKind;

/// Result type alias for audiosum operations
pub type SumResult<T> = Result<T, SumError>;

/// Errors that can occur while resolving or digesting a file
#[derive(Debug)]
pub enum SumError {
    /// I/O error outside of tag probing (open, digest read, stdin)
    Io(io::Error),
    /// A probe could not seek to or read its window
    TagIo { tag: TagKind, source: io::Error },
    /// A trailing signature was found but its pair or size field is inconsistent
    MalformedTag { tag: TagKind, reason: String },
    /// Digest algorithm name not recognized
    UnsupportedAlgorithm(String),
    /// Serialization error (JSON output)
    Serialization(serde_json::Error),
}

impl SumError {
    pub(crate) fn tag_io(tag: TagKind, source: io::Error) -> Self {
        SumError::TagIo { tag, source }
    }

    pub(crate) fn malformed(tag: TagKind, reason: impl Into<String>) -> Self {
        SumError::MalformedTag { tag, reason: reason.into() }
    }

    /// Errors that stop the whole run rather than a single file
    pub fn is_config_error(&self) -> bool {
        matches!(self, SumError::UnsupportedAlgorithm(_))
    }

    /// The probe that failed, if this error came from tag probing
    pub fn tag(&self) -> Option<TagKind> {
        match self {
            SumError::TagIo { tag, .. } | SumError::MalformedTag { tag, .. } => Some(*tag),
            _ => None,
        }
    }
}

impl fmt::Display for SumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SumError::Io(e) => write!(f, "I/O error: {}", e),
            SumError::TagIo { tag, source } => {
                write!(f, "I/O error while analyzing {}: {}", tag.name(), source)
            }
            SumError::MalformedTag { tag, reason } => {
                write!(f, "Malformed {} tag: {}", tag.name(), reason)
            }
            SumError::UnsupportedAlgorithm(name) => write!(
                f,
                "Unsupported hash algorithm: '{}'. Supported: {}",
                name,
                crate::common::hash::supported_names().join(", ")
            ),
            SumError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for SumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SumError::Io(e) => Some(e),
            SumError::TagIo { source, .. } => Some(source),
            SumError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SumError {
    fn from(err: io::Error) -> Self {
        SumError::Io(err)
    }
}

impl From<serde_json::Error> for SumError {
    fn from(err: serde_json::Error) -> Self {
        SumError::Serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_probe() {
        let err = SumError::malformed(TagKind::Lyrics3v1, "LYRICSEND without LYRICSBEGIN");
        assert_eq!(
            err.to_string(),
            "Malformed Lyrics3v1 tag: LYRICSEND without LYRICSBEGIN"
        );
        assert_eq!(err.tag(), Some(TagKind::Lyrics3v1));
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_config_error() {
        let err = SumError::UnsupportedAlgorithm("rot13".to_string());
        assert!(err.is_config_error());
        assert!(err.to_string().contains("'rot13'"));
        assert!(err.to_string().contains("md5"));
        assert_eq!(err.tag(), None);
    }

    #[test]
    fn test_tag_io_has_source() {
        let err = SumError::tag_io(
            TagKind::Id3v1,
            io::Error::new(io::ErrorKind::UnexpectedEof, "short"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("I/O error while analyzing ID3v1"));
    }
}

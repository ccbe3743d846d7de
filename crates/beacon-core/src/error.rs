//! Error types for the beacon wire format

use thiserror::Error;

/// Errors that can occur while decoding beacon records
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Request tag is not one of the known 4-byte ASCII tags
    #[error("unknown request tag: {}", format_tag(.0))]
    UnknownTag([u8; 4]),

    /// Record does not have the fixed length for its kind
    #[error("invalid record length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Result type for wire decoding
pub type WireResult<T> = Result<T, WireError>;

/// Render a tag as ASCII when printable, hex otherwise
fn format_tag(tag: &[u8; 4]) -> String {
    if tag.iter().all(|b| b.is_ascii_graphic()) {
        format!("\"{}\"", String::from_utf8_lossy(tag))
    } else {
        format!(
            "0x{:02X}{:02X}{:02X}{:02X}",
            tag[0], tag[1], tag[2], tag[3]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_display() {
        let err = WireError::UnknownTag(*b"XXXX");
        assert_eq!(err.to_string(), "unknown request tag: \"XXXX\"");

        let err = WireError::UnknownTag([0x00, 0x01, 0xFF, 0x41]);
        assert_eq!(err.to_string(), "unknown request tag: 0x0001FF41");
    }

    #[test]
    fn test_invalid_length_display() {
        let err = WireError::InvalidLength {
            expected: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid record length: expected 4 bytes, got 3"
        );
    }
}

use std::io;
use thiserror::Error;

/// Result type for stream operations
pub type VgmResult<T> = Result<T, VgmError>;

/// Error types for stream detection, decoding and output
#[derive(Error, Debug)]
pub enum VgmError {
    /// IO error (file operations, disk access)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No recognizer accepted the byte source
    #[error("Unsupported stream format: {0}")]
    UnsupportedFormat(String),

    /// Header fields are missing or inconsistent
    #[error("Invalid stream metadata: {0}")]
    InvalidMetadata(String),

    /// A read went past the end of the byte source
    #[error("Read out of bounds: {len} bytes at offset {offset:#x}")]
    ReadOutOfBounds {
        /// Offset of the failed read
        offset: u64,
        /// Number of bytes requested
        len: usize,
    },

    /// Decoding failed
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Encoding failed
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// Invalid channel configuration
    #[error("Invalid channel configuration: expected {expected}, got {got}")]
    InvalidChannels {
        /// Expected number of channels
        expected: usize,
        /// Got number of channels
        got: usize,
    },

    /// Invalid sample rate
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate
        rate: u32,
    },

    /// Buffer-related error
    #[error("Buffer error: {0}")]
    BufferError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<symphonia::core::errors::Error> for VgmError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        match err {
            symphonia::core::errors::Error::IoError(e) => VgmError::Io(e),
            symphonia::core::errors::Error::Unsupported(what) => {
                VgmError::UnsupportedFormat(what.to_string())
            }
            e => VgmError::DecodeError(e.to_string()),
        }
    }
}

impl From<hound::Error> for VgmError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => VgmError::Io(e),
            e => VgmError::EncodeError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VgmError::ReadOutOfBounds { offset: 0x40, len: 8 };
        assert_eq!(err.to_string(), "Read out of bounds: 8 bytes at offset 0x40");

        let err = VgmError::InvalidChannels { expected: 2, got: 1 };
        assert!(err.to_string().contains("expected 2, got 1"));
    }

    #[test]
    fn test_io_conversion() {
        let err: VgmError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, VgmError::Io(_)));
    }
}

//! Network error types for serialization and protocol operations.

use thiserror::Error;

/// Errors that can occur while encoding or decoding table payloads and frames.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Failed to encode a frame envelope
    #[error("Failed to encode message: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Failed to decode a frame envelope
    #[error("Failed to decode message: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Ran out of bytes in the middle of a field
    #[error("Unexpected end of payload: needed {needed} more byte(s)")]
    UnexpectedEof { needed: usize },

    /// Message size exceeded maximum allowed
    #[error("Message size {actual} exceeds maximum {max}")]
    MessageTooLarge { actual: usize, max: usize },

    /// Stream failure underneath a frame
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid message format
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),
}

/// Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;

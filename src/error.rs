//! Error types for the bijective codec.

use thiserror::Error;

/// Error variants for encoding and decoding operations.
///
/// Malformed compressed input is not representable: every finite byte
/// sequence is a valid compressed stream, so the only recoverable failure
/// is I/O on the underlying byte sink or source. Violations of internal
/// coder invariants are bugs and panic instead.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred on the underlying byte stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

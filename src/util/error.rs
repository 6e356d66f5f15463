//! Error types for the crazyfile library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for crazyfile operations.
///
/// Every variant is terminal for the document being transformed: nothing
/// here is retried, the caller decides whether to skip or abort.
#[derive(Error, Debug)]
pub enum Error {
    /// A sequence long enough to collapse holds a value that cannot be
    /// coerced to the chosen dtype
    #[error("Sequence cannot be encoded as {dtype}: {reason}")]
    NonNumericSequence { dtype: String, reason: String },

    /// A sequence of sequences has rows of different shapes
    #[error("Irregular array shape: {0}")]
    IrregularShape(String),

    /// Array payload header is missing, unrecognized or inconsistent
    #[error("Malformed array payload: {0}")]
    MalformedPayload(String),

    /// Array payload declares more element bytes than it carries
    #[error("Truncated array payload: expected {expected} data bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },

    /// Array payload written by an unknown format version
    #[error("Unsupported array payload version: {0}")]
    UnsupportedVersion(u8),

    /// Blob bytes are not a valid gzip stream
    #[error("Corrupt frame: {0}")]
    CorruptFrame(String),

    /// Gzip encoder failed
    #[error("Compression failed: {0}")]
    CompressionFailure(#[source] std::io::Error),

    /// Document cannot be represented as a node tree
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Settings value out of range or unknown
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },

    /// Input/output file name violates the `.crazy` naming rules
    #[error("Invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed payload error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create an invalid document error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a non-numeric sequence error for the given dtype name.
    pub fn non_numeric(dtype: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NonNumericSequence {
            dtype: dtype.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid setting error.
    pub fn setting(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid path error.
    pub fn path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for crazyfile operations.
pub type Result<T> = std::result::Result<T, Error>;

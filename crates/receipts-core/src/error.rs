//! Error types for the receipts-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the receipts library.
#[derive(Error, Debug)]
pub enum ReceiptError {
    /// The receipt image could not be accessed.
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value violates its contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A token or detection does not have the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Configuration file error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReceiptError {
    /// Wrap an I/O failure on `path`.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReceiptError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// True when the error reports a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReceiptError::FileAccess { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Errors raised by an OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text detection failed: {0}")]
    Detection(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl From<image::ImageError> for OcrError {
    fn from(err: image::ImageError) -> Self {
        OcrError::InvalidImage(err.to_string())
    }
}

/// Result type for the receipts library.
pub type Result<T> = std::result::Result<T, ReceiptError>;

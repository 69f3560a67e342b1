use thiserror::Error;

/// Errors that can occur while storing or reading uploaded photos.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested photo was not found.
    #[error("photo not found: {0}")]
    NotFound(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file name is not a flat, safe name.
    #[error("invalid photo name: {0}")]
    InvalidName(String),
    /// The upload exceeds the configured size limit.
    #[error("photo exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}

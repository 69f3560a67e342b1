use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Location and size of a stored photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    /// Path recorded on the try-on row, e.g. `uploads/<file name>`.
    pub path: String,
    pub size: u64,
}

/// Storage for uploaded photos, addressed by flat file name.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Drain `reader` into a new photo named `file_name`.
    ///
    /// The reader is borrowed so request-scoped sources (a multipart field)
    /// can be streamed without buffering them first.
    async fn put_stream(
        &self,
        file_name: &str,
        reader: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<StoredPhoto, StorageError>;

    /// Open a previously stored photo by the path returned from `put_stream`.
    async fn open(&self, path: &str) -> Result<BoxReader, StorageError>;

    /// Size in bytes of a stored photo.
    async fn size(&self, path: &str) -> Result<u64, StorageError>;

    /// Remove a stored photo. Removing a missing photo is not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

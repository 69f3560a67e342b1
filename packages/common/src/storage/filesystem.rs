use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};

use super::error::StorageError;
use super::traits::{BoxReader, PhotoStore, StoredPhoto};

/// Filesystem-backed photo store.
///
/// Photos live directly under `base_path`; partial uploads are written to
/// `{base_path}/.tmp` and renamed into place once complete.
pub struct FilesystemPhotoStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemPhotoStore {
    /// Create a new filesystem photo store.
    pub async fn new(base_path: impl Into<PathBuf>, max_size: u64) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Resolve a recorded path back to a file inside `base_path`.
    ///
    /// Only the final component is honoured, so recorded paths can never
    /// escape the store directory.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidName(path.to_string()))?;
        let name = validate_name(name)?;
        Ok(self.base_path.join(name))
    }
}

fn validate_name(name: &str) -> Result<&str, StorageError> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.chars().any(|c| c.is_ascii_control())
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(name)
}

#[async_trait]
impl PhotoStore for FilesystemPhotoStore {
    async fn put_stream(
        &self,
        file_name: &str,
        reader: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<StoredPhoto, StorageError> {
        let file_name = validate_name(file_name)?;
        let target = self.base_path.join(file_name);
        let temp_path = self.temp_path();

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut total_bytes: u64 = 0;
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredPhoto {
            path: target.to_string_lossy().into_owned(),
            size: total_bytes,
        })
    }

    async fn open(&self, path: &str) -> Result<BoxReader, StorageError> {
        let file_path = self.resolve(path)?;
        match fs::File::open(&file_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let file_path = self.resolve(path)?;
        match fs::metadata(&file_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let file_path = self.resolve(path)?;
        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

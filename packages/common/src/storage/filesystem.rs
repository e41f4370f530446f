use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};

use super::error::StorageError;
use super::naming::{is_safe_extension, unique_filename, validate_flat_filename};
use super::traits::{BoxReader, ImageStore};

/// Attempts at finding an unused generated name before giving up.
const NAME_ATTEMPTS: usize = 8;

/// Filesystem-backed image store.
///
/// Images live directly in `base_path` under their generated names. Writes go
/// through `{base_path}/.tmp` and are renamed into place once complete.
pub struct FilesystemImageStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemImageStore {
    /// Create a new filesystem image store, creating the content directory if missing.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Resolve an image name to its path, refusing anything but a flat filename.
    fn image_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let name = validate_flat_filename(name)
            .map_err(|e| StorageError::InvalidName(e.message().to_string()))?;
        Ok(self.base_path.join(name))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Move a completed temp file to a fresh generated name.
    async fn publish(&self, temp_path: &Path, extension: &str) -> Result<String, StorageError> {
        for _ in 0..NAME_ATTEMPTS {
            let name = unique_filename(extension);
            let target = self.base_path.join(&name);
            if fs::try_exists(&target).await? {
                continue;
            }
            fs::rename(temp_path, &target).await?;
            return Ok(name);
        }
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "could not find an unused image name",
        )))
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn put_stream(
        &self,
        mut reader: BoxReader,
        extension: &str,
    ) -> Result<String, StorageError> {
        if !is_safe_extension(extension) {
            return Err(StorageError::InvalidName(format!(
                "unsupported extension '{extension}'"
            )));
        }

        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = reader.read(&mut buf).await?;
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

            tokio::io::AsyncWriteExt::write_all(&mut temp_file, &buf[..n]).await?;
        }

        tokio::io::AsyncWriteExt::flush(&mut temp_file).await?;
        drop(temp_file);

        match self.publish(&temp_path, extension).await {
            Ok(name) => Ok(name),
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                Err(e)
            }
        }
    }

    async fn get_stream(&self, name: &str) -> Result<BoxReader, StorageError> {
        let path = self.image_path(name)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.image_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, name: &str) -> Result<u64, StorageError> {
        let path = self.image_path(name)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(StorageError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

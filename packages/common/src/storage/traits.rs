use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Storage for uploaded images, addressed by generated flat filenames.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store data from an async reader under a freshly generated name.
    ///
    /// The name keeps `extension` (without the leading dot) when it is non-empty.
    async fn put_stream(&self, reader: BoxReader, extension: &str)
    -> Result<String, StorageError>;

    /// Retrieve an image as a streaming async reader.
    async fn get_stream(&self, name: &str) -> Result<BoxReader, StorageError>;

    /// Delete an image.
    ///
    /// Returns `true` if the image was deleted, `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;

    /// Get the size of an image in bytes.
    async fn size(&self, name: &str) -> Result<u64, StorageError>;
}

mod error;
mod traits;

pub mod filesystem;
pub mod naming;
pub mod policy;

pub use error::StorageError;
pub use filesystem::FilesystemImageStore;
pub use policy::{AcceptedImage, ImageFormat, ImageRejection, check_image};
pub use traits::{BoxReader, ImageStore};

mod error;
mod naming;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use naming::{photo_extension, photo_file_name};
pub use traits::{BoxReader, PhotoStore, StoredPhoto};

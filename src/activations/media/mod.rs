//! Media activation module
//!
//! Image uploads handed to an external object store; only the returned
//! public URLs reach the catalog.

mod activation;
mod storage;
mod types;

pub use activation::{media_router, Media};
pub use storage::{ImageKitConfig, ImageKitStore, LocalMediaConfig, LocalMediaStore, MediaStore};
pub use types::{
    sanitize_file_name, MediaError, UploadResponse, UploadTarget, UploadedFile,
    MAX_FILES_PER_UPLOAD,
};

//! Media upload types

use serde::Serialize;

/// Most files accepted in one upload request
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// Where an upload is filed and how its stored name is formed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Product images, `/products/product_<unix-ms>_<original>`
    Products,
    /// Category images, `/categories/category_<original>`
    Categories,
}

impl UploadTarget {
    pub fn folder(&self) -> &'static str {
        match self {
            UploadTarget::Products => "/products",
            UploadTarget::Categories => "/categories",
        }
    }

    /// Stored file name for an uploaded file, stamped at `now_ms`
    pub fn file_name(&self, original: &str, now_ms: i64) -> String {
        let original = sanitize_file_name(original);
        match self {
            UploadTarget::Products => format!("product_{}_{}", now_ms, original),
            UploadTarget::Categories => format!("category_{}", original),
        }
    }
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are dropped so the result never names a parent or hidden file.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// One file taken from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub image_urls: Vec<String>,
}

/// Error type for media operations
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No image files found in request")]
    NoFiles,

    #[error("Too many files: {0} (at most 10 per request)")]
    TooManyFiles(usize),

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::Upload(err.to_string())
    }
}

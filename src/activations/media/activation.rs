//! Media activation - image uploads for products and categories

use super::storage::MediaStore;
use super::types::{
    MediaError, UploadResponse, UploadTarget, UploadedFile, MAX_FILES_PER_UPLOAD,
};
use crate::errors::ApiResult;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Multipart field carrying the files
const FILE_FIELD: &str = "images";

/// Upper bound on a whole upload request body
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct Media {
    store: Arc<dyn MediaStore>,
}

impl Media {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.name()
    }

    /// Upload every file and return their public URLs in request order.
    /// Stops at the first failed upload.
    pub async fn upload(
        &self,
        target: UploadTarget,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<String>, MediaError> {
        if files.is_empty() {
            return Err(MediaError::NoFiles);
        }
        if files.len() > MAX_FILES_PER_UPLOAD {
            return Err(MediaError::TooManyFiles(files.len()));
        }

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let now_ms = chrono::Utc::now().timestamp_millis();
            let file_name = target.file_name(&file.original_name, now_ms);
            let url = self
                .store
                .upload(file.bytes, &file_name, target.folder())
                .await
                .map_err(|e| {
                    tracing::error!(backend = self.store.name(), file = %file_name, error = %e, "Image upload failed");
                    e
                })?;
            urls.push(url);
        }

        tracing::info!(backend = self.store.name(), folder = target.folder(), count = urls.len(), "Images uploaded");
        Ok(urls)
    }
}

pub fn media_router(media: Media) -> Router {
    Router::new()
        .route("/api/upload-images", post(upload_product_images))
        .route("/api/upload", post(upload_category_images))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(media)
}

/// Collect the `images` fields of a multipart body
async fn read_files(multipart: &mut Multipart) -> Result<Vec<UploadedFile>, MediaError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MediaError::Multipart(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("image").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MediaError::Multipart(e.to_string()))?;
        files.push(UploadedFile {
            original_name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

async fn upload_with(
    media: &Media,
    target: UploadTarget,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let files = read_files(&mut multipart).await?;
    let image_urls = media.upload(target, files).await?;
    Ok(Json(UploadResponse {
        message: format!("{} images uploaded", image_urls.len()),
        image_urls,
    }))
}

async fn upload_product_images(
    State(media): State<Media>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    upload_with(&media, UploadTarget::Products, multipart?).await
}

async fn upload_category_images(
    State(media): State<Media>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    upload_with(&media, UploadTarget::Categories, multipart?).await
}

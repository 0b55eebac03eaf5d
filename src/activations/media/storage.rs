//! Binary object stores for uploaded images
//!
//! The catalog only ever keeps the public URL a store hands back.

use super::types::MediaError;
use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use std::path::PathBuf;

const IMAGEKIT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";

/// `upload(bytes, name, folder) -> public URL`
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, folder: &str) -> Result<String, MediaError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

// ============================================================================
// ImageKit
// ============================================================================

#[derive(Debug, Clone)]
pub struct ImageKitConfig {
    pub private_key: String,
    /// Public URL prefix, used when a response carries a path but no URL
    pub url_endpoint: Option<String>,
}

/// Uploads to ImageKit's HTTP upload API
pub struct ImageKitStore {
    client: Client,
    config: ImageKitConfig,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageKitUploadResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
}

impl ImageKitStore {
    pub fn new(config: ImageKitConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            upload_url: IMAGEKIT_UPLOAD_URL.to_string(),
        }
    }

    fn public_url(&self, response: ImageKitUploadResponse) -> Result<String, MediaError> {
        if let Some(url) = response.url {
            return Ok(url);
        }
        match (&self.config.url_endpoint, response.file_path) {
            (Some(endpoint), Some(path)) => Ok(format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                path.trim_start_matches('/')
            )),
            _ => Err(MediaError::Upload("upload response carried no URL".into())),
        }
    }
}

#[async_trait]
impl MediaStore for ImageKitStore {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, folder: &str) -> Result<String, MediaError> {
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name(file_name.to_string()))
            .text("fileName", file_name.to_string())
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .basic_auth(&self.config.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MediaError::Upload(format!(
                "ImageKit responded with status {}: {}",
                status, text
            )));
        }

        let body: ImageKitUploadResponse = response.json().await?;
        self.public_url(body)
    }

    fn name(&self) -> &'static str {
        "imagekit"
    }
}

// ============================================================================
// Local directory
// ============================================================================

#[derive(Debug, Clone)]
pub struct LocalMediaConfig {
    /// Directory files are written under (one subdirectory per folder)
    pub root: PathBuf,
    /// URL prefix the directory is served at
    pub base_url: String,
}

impl Default for LocalMediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            base_url: "/media".to_string(),
        }
    }
}

/// Writes uploads to disk; used when no ImageKit key is configured
pub struct LocalMediaStore {
    config: LocalMediaConfig,
}

impl LocalMediaStore {
    pub fn new(config: LocalMediaConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &PathBuf {
        &self.config.root
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, folder: &str) -> Result<String, MediaError> {
        let folder = folder.trim_matches('/');
        let dir = self.config.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;

        Ok(format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            folder,
            file_name
        ))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

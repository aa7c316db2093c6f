//! Image Hosting Client
//!
//! Uploads profile images to the external image host and returns the public
//! URL it assigns.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::ImageConfig;

#[derive(Error, Debug)]
pub enum ImageStoreError {
    /// The image failed local checks and was never sent
    #[error("{0}")]
    Rejected(String),

    #[error("Image upload timed out")]
    Timeout,

    #[error("Image host request failed: {0}")]
    Http(String),

    #[error("Image host returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected image host response: {0}")]
    Malformed(String),
}

/// Image file received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Local checks run before anything leaves the process
    pub fn check(&self, max_bytes: usize) -> Result<(), ImageStoreError> {
        if self.bytes.is_empty() {
            return Err(ImageStoreError::Rejected(
                "profileImage is empty".to_string(),
            ));
        }

        if self.bytes.len() > max_bytes {
            return Err(ImageStoreError::Rejected(format!(
                "profileImage exceeds the {} byte limit",
                max_bytes
            )));
        }

        match self.content_type.as_deref() {
            Some(content_type) if content_type.starts_with("image/") => Ok(()),
            Some(content_type) => Err(ImageStoreError::Rejected(format!(
                "profileImage must be an image, got '{}'",
                content_type
            ))),
            None => Err(ImageStoreError::Rejected(
                "profileImage is missing a content type".to_string(),
            )),
        }
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the image and returns its public URL
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadedImage,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: String,
}

/// Client for an imgbb-compatible upload API
#[derive(Clone)]
pub struct ImgbbImageStore {
    http_client: HttpClient,
    upload_url: String,
    api_key: String,
}

impl ImgbbImageStore {
    pub fn new(
        upload_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, ImageStoreError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageStoreError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            upload_url,
            api_key,
        })
    }

    pub fn from_config(config: &ImageConfig) -> Result<Self, ImageStoreError> {
        Self::new(
            config.upload_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.upload_timeout_seconds),
        )
    }
}

#[async_trait]
impl ImageStore for ImgbbImageStore {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageStoreError> {
        let encoded = STANDARD.encode(&image.bytes);
        let mut form = vec![("key", self.api_key.as_str()), ("image", encoded.as_str())];
        if let Some(name) = image.file_name.as_deref() {
            form.push(("name", name));
        }

        let response = self
            .http_client
            .post(&self.upload_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageStoreError::Timeout
                } else {
                    ImageStoreError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageStoreError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageStoreError::Malformed(e.to_string()))?;

        if parsed.data.url.is_empty() {
            return Err(ImageStoreError::Malformed(
                "response did not include an image url".to_string(),
            ));
        }

        log::debug!("Uploaded profile image to {}", parsed.data.url);
        Ok(parsed.data.url)
    }
}

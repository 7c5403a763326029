//! Blob storage upload for the asynchronous recognition path.

use crate::error::{Result, TalerError};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Blob storage client. Objects are named by item id.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload the file as `object_name`, returning the object's URI.
    async fn upload(&self, object_name: &str, path: &Path) -> Result<String>;
}

/// Google Cloud Storage media upload.
pub struct GcsUploader {
    http: reqwest::Client,
    api_key: String,
    bucket: String,
}

impl GcsUploader {
    pub fn new(api_key: String, bucket: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            bucket,
        }
    }
}

#[async_trait]
impl Uploader for GcsUploader {
    async fn upload(&self, object_name: &str, path: &Path) -> Result<String> {
        if self.bucket.is_empty() {
            return Err(TalerError::Config(
                "storage.bucket is not configured; required for async recognition".to_string(),
            ));
        }

        let bytes = tokio::fs::read(path).await?;
        let url = format!(
            "https://storage.googleapis.com/upload/storage/v1/b/{}/o?uploadType=media&name={}&key={}",
            self.bucket, object_name, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "audio/wav")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TalerError::Upload(format!(
                "storage returned {status}: {body}"
            )));
        }

        info!("Uploaded {} to gs://{}", object_name, self.bucket);
        Ok(format!("gs://{}/{}", self.bucket, object_name))
    }
}

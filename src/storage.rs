//! # Image Storage
//!
//! The storage collaborator seam of the orchestrator and its R2 implementation.
//!
//! The orchestrator only needs "store this file for this owner and tell me
//! where it lives"; whatever goes wrong on the way is opaque to it and is
//! reported as a [`StorageError`].

use std::collections::HashMap;

use async_trait::async_trait;
use worker::{Bucket, HttpMetadata, Response};

use crate::config::Config;
use crate::errors::{AppError, AppResult, StorageError};
use crate::models::ImageFile;
use crate::owner::OwnerId;
use crate::utils::{generate_r2_key, image_url, sha256_hex};

/// Something that durably stores image files and hands back a URL.
///
/// Workers run single threaded, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait ImageStorage {
    /// Stores `file` tagged with `owner` and returns its public URL.
    async fn upload_image(&self, file: &ImageFile, owner: &OwnerId) -> Result<String, StorageError>;
}

/// R2-backed image storage.
pub struct R2ImageStorage<'a> {
    bucket: Bucket,
    config: &'a Config,
}

impl<'a> R2ImageStorage<'a> {
    pub fn new(bucket: Bucket, config: &'a Config) -> Self {
        Self { bucket, config }
    }

    /// Streams a stored object back with its recorded content type.
    pub async fn serve(&self, key: &str) -> AppResult<Response> {
        let object = self
            .bucket
            .get(key)
            .execute()
            .await?
            .ok_or_else(|| AppError::NotFound(key.to_string()))?;

        let content_type = object
            .http_metadata()
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let body = object
            .body()
            .ok_or_else(|| AppError::NotFound(key.to_string()))?
            .bytes()
            .await?;

        let mut response = Response::from_bytes(body)?;
        response.headers_mut().set("Content-Type", &content_type)?;
        response
            .headers_mut()
            .set("Cache-Control", "public, max-age=31536000, immutable")?;
        Ok(response)
    }
}

#[async_trait(?Send)]
impl ImageStorage for R2ImageStorage<'_> {
    async fn upload_image(&self, file: &ImageFile, owner: &OwnerId) -> Result<String, StorageError> {
        let key = generate_r2_key(&self.config.key_prefix, owner.as_str(), &file.name);

        let mut custom_metadata = HashMap::new();
        custom_metadata.insert("sha256".to_string(), sha256_hex(&file.data));
        custom_metadata.insert("original-name".to_string(), file.name.clone());
        custom_metadata.insert("owner".to_string(), owner.to_string());

        self.bucket
            .put(&key, file.data.clone())
            .http_metadata(HttpMetadata {
                content_type: Some(file.content_type.clone()),
                ..Default::default()
            })
            .custom_metadata(custom_metadata)
            .execute()
            .await
            .map_err(|err| match err {
                // A thrown JS exception is a fault; anything else is an answer from R2.
                worker::Error::JsError(_) | worker::Error::Internal(_) => {
                    StorageError::Fault(err.to_string())
                }
                other => StorageError::Rejected(other.to_string()),
            })?;

        Ok(image_url(&self.config.public_base_url, &key))
    }
}

//! # Configuration Management
//!
//! This module provides configuration management for the image upload service.
//! Configuration is stored in Cloudflare KV storage and loaded at runtime with
//! defaults for every setting, so a partial JSON document is enough.
//!
//! ## Configuration Options
//!
//! - `max_file_size`: Maximum allowed image size in bytes (default: 5MB)
//! - `allowed_mime_types`: Content types accepted by validation
//! - `max_images`: Upper bound on images per product (default: 5)
//! - `bucket_name`: Name of the R2 bucket binding
//! - `public_base_url`: Origin used when building image URLs
//! - `key_prefix`: Top-level R2 prefix for product images
//!
//! ## Example
//!
//! ```rust
//! let kv = env.kv("STORAGE_CONFIG")?;
//! let config = Config::load(&kv).await?;
//! println!("Max file size: {} bytes", config.max_file_size);
//! ```

use crate::constants::{
    CONFIG_KV_KEY, DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_KEY_PREFIX, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_MAX_IMAGES, DEFAULT_PUBLIC_BASE_URL, STORAGE_BUCKET_NAME,
};
use serde::{Deserialize, Serialize};
use worker::kv::KvStore;
use worker::{console_log, Result};

/// Configuration structure for the image upload service.
///
/// Validation reads `allowed_mime_types` and `max_file_size`; the orchestrator
/// treats the whole struct as read-only shared state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum allowed image size in bytes.
    pub max_file_size: u64,

    /// Content types accepted for upload.
    pub allowed_mime_types: Vec<String>,

    /// Maximum number of images per product. Requests may ask for less, never more.
    pub max_images: usize,

    /// Name of the R2 bucket binding. Must match wrangler.toml.
    pub bucket_name: String,

    /// Public origin of this worker, without a trailing slash.
    pub public_base_url: String,

    /// Top-level R2 key prefix.
    pub key_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|mime| mime.to_string())
                .collect(),
            max_images: DEFAULT_MAX_IMAGES,
            bucket_name: STORAGE_BUCKET_NAME.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from KV storage with fallback to defaults.
    ///
    /// # Configuration Format
    ///
    /// The expected JSON format in KV storage (every field optional):
    /// ```json
    /// {
    ///   "max_file_size": 5242880,
    ///   "allowed_mime_types": ["image/jpeg", "image/png", "image/webp"],
    ///   "max_images": 5,
    ///   "public_base_url": "https://images.example.com"
    /// }
    /// ```
    ///
    /// # Error Handling
    ///
    /// - A missing key yields the defaults
    /// - KV access errors and invalid JSON are propagated
    pub async fn load(kv: &KvStore) -> Result<Self> {
        match kv.get(CONFIG_KV_KEY).json::<Self>().await? {
            Some(config) => {
                console_log!("Configuration loaded from KV storage");
                Ok(config)
            }
            None => {
                console_log!("Config not found in KV, using default");
                Ok(Self::default())
            }
        }
    }

    /// Size ceiling in whole megabytes, as shown to users.
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / 1024 / 1024
    }

    /// Whether `content_type` is one of the allowed types.
    pub fn allows_mime_type(&self, content_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type.trim()))
    }

    /// Help line shown under the upload area.
    pub fn help_text(&self, max_images: usize) -> String {
        format!(
            "JPG, PNG, WebP tot {}MB. Maximaal {} afbeeldingen.",
            self.max_file_size_mb(),
            max_images
        )
    }
}

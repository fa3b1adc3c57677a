//! # Application Constants
//!
//! This module defines application-wide constants used throughout the image
//! upload service. Centralizing constants keeps binding names, limits and the
//! storefront's user-facing text in one place.
//!
//! ## Binding Names
//!
//! Constants for Cloudflare Worker bindings that must match wrangler.toml configuration.
//!
//! ## Limits
//!
//! Default image limits used when the KV configuration does not override them.
//!
//! ## User-Facing Text
//!
//! The storefront is Dutch-only; every message shown to a shopkeeper lives here.

/// Standard KV configuration binding name
pub const STORAGE_CONFIG_KV_NAME: &str = "STORAGE_CONFIG";

/// Key under which the JSON configuration is stored in KV
pub const CONFIG_KV_KEY: &str = "config";

/// Standard R2 bucket binding name
pub const STORAGE_BUCKET_NAME: &str = "STORAGE_BUCKET";

/// Default maximum image size (5MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default number of images a single product may carry
pub const DEFAULT_MAX_IMAGES: usize = 5;

/// Content types accepted by default
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Default public origin used to build image URLs
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

/// Default R2 key prefix for product images
pub const DEFAULT_KEY_PREFIX: &str = "products";

/// Route prefix for all image operations
pub const IMAGES_ROUTE_PREFIX: &str = "/v1/images";

/// Prefix of locally generated owner identifiers
pub const TEMP_OWNER_PREFIX: &str = "temp-";

/// Number of random base36 characters in a temporary owner identifier
pub const TEMP_OWNER_RANDOM_LEN: usize = 13;

/// Progress value recorded when a file is handed to storage
pub const PROGRESS_STARTED: u8 = 0;

/// Progress value recorded once storage confirms the file
pub const PROGRESS_DONE: u8 = 100;

/// Reason shown when storage fails without an explanation
pub const MSG_UPLOAD_FAILED: &str = "Upload mislukt";

/// Reason shown for a content type outside the allowed set
pub const MSG_UNSUPPORTED_TYPE: &str = "Alleen JPG, PNG en WebP afbeeldingen zijn toegestaan";

/// Form field carrying the selected files
pub const FIELD_FILES: &str = "files";

/// Form field carrying the current image list as a JSON array
pub const FIELD_IMAGES: &str = "images";

/// Form field carrying the requested image limit
pub const FIELD_MAX_IMAGES: &str = "max_images";

/// Form field carrying a persistent product identifier
pub const FIELD_PRODUCT_ID: &str = "product_id";

/// CORS header for allowed origins
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// CORS header for allowed methods
pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// CORS header for allowed headers
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Security headers sent with every response
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("X-Frame-Options", "DENY"),
    ("X-Content-Type-Options", "nosniff"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("X-XSS-Protection", "1; mode=block"),
];

//! # Middleware Components
//!
//! Cross-cutting request/response concerns of the image upload service.
//!
//! ## Middleware Types
//!
//! - **CORS Middleware**: Cross-origin support and the storefront's security headers
//! - **Validation Middleware**: The image validation rule (content type and size)
//!
//! ## Usage Examples
//!
//! ```rust
//! // Handle CORS preflight
//! if req.method() == Method::Options {
//!     return CorsMiddleware::handle_preflight();
//! }
//!
//! // Validate a picked file
//! ValidationMiddleware::validate_image_file(&file.content_type, file.size, &config)?;
//! ```

use crate::config::Config;
use crate::constants::{
    CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, SECURITY_HEADERS,
};
use crate::errors::ValidationFailure;
use worker::*;

/// Middleware for CORS and security response headers.
///
/// Every response leaving the worker goes through `apply_headers`, so the
/// security headers the storefront sends on its own pages also cover images.
pub struct CorsMiddleware;

impl CorsMiddleware {
    /// Headers added to every response.
    pub fn header_pairs() -> impl Iterator<Item = (&'static str, &'static str)> {
        [
            ("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN),
            ("Access-Control-Allow-Methods", CORS_ALLOW_METHODS),
            ("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS),
        ]
        .into_iter()
        .chain(SECURITY_HEADERS.iter().copied())
    }

    /// Adds CORS and security headers to an existing response, keeping the
    /// headers it already has.
    pub fn apply_headers(mut response: Response) -> Result<Response> {
        let headers = response.headers_mut();
        for (name, value) in Self::header_pairs() {
            headers.set(name, value)?;
        }
        Ok(response)
    }

    /// Handles CORS preflight requests (OPTIONS method).
    pub fn handle_preflight() -> Result<Response> {
        Self::apply_headers(Response::empty()?)
    }
}

/// The image validation rule.
///
/// Pure functions over a file's declared content type and size, checked
/// against the shared configuration. Safe to call on every file independently.
pub struct ValidationMiddleware;

impl ValidationMiddleware {
    /// Validates a file against both rules. The content type is checked first.
    ///
    /// # Example
    ///
    /// ```rust
    /// ValidationMiddleware::validate_image_file("image/png", 1_024, &config)?; // OK
    /// ValidationMiddleware::validate_image_file("image/gif", 1_024, &config)?; // Error
    /// ```
    pub fn validate_image_file(
        content_type: &str,
        size: u64,
        config: &Config,
    ) -> std::result::Result<(), ValidationFailure> {
        Self::validate_content_type(content_type, config)?;
        Self::validate_file_size(size, config)
    }

    /// Checks the declared MIME type against the allowed set.
    ///
    /// Content type validation is based on the client-provided MIME type.
    pub fn validate_content_type(
        content_type: &str,
        config: &Config,
    ) -> std::result::Result<(), ValidationFailure> {
        if !config.allows_mime_type(content_type) {
            return Err(ValidationFailure::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    /// Checks that a file size does not exceed the configured ceiling.
    pub fn validate_file_size(
        size: u64,
        config: &Config,
    ) -> std::result::Result<(), ValidationFailure> {
        if size > config.max_file_size {
            return Err(ValidationFailure::TooLarge {
                size,
                max_mb: config.max_file_size_mb(),
            });
        }
        Ok(())
    }
}

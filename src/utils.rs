//! # Utility Functions
//!
//! Helpers shared by the storage layer, the handlers and the owner slot:
//! R2 key generation, identifiers, digests and URL/date formatting.
//!
//! ## File Organization Strategy
//!
//! Images are stored under their owner so a product's images can be listed
//! or purged together:
//!
//! ```text
//! {prefix}/{owner}/{timestamp}-{uuid8}-{fileName}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::IMAGES_ROUTE_PREFIX;

/// Generates the R2 key for an image owned by `owner`.
///
/// The timestamp and UUID fragment keep two uploads of `photo.jpg` for the
/// same product apart.
///
/// # Example
///
/// ```rust
/// let key = generate_r2_key("products", "temp-1700000000000-abc", "photo.jpg");
/// // Returns: "products/temp-1700000000000-abc/1700000000123-1f2e3d4c-photo.jpg"
/// ```
pub fn generate_r2_key(prefix: &str, owner: &str, file_name: &str) -> String {
    let prefix = sanitize_path_component(prefix);
    let owner = sanitize_path_component(owner);
    let file_name = sanitize_filename(file_name);
    let uuid = Uuid::new_v4().simple().to_string();
    let timestamp = Utc::now().timestamp_millis();

    format!("{}/{}/{}-{}-{}", prefix, owner, timestamp, &uuid[..8], file_name)
}

/// Sanitizes a path component to prevent security issues.
///
/// Keeps alphanumerics, `-` and `_`, limited to 64 characters.
fn sanitize_path_component(component: &str) -> String {
    let safe: String = component
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect::<String>()
        .to_lowercase();

    if safe.is_empty() {
        "unknown".to_string()
    } else {
        safe
    }
}

/// Sanitizes a filename, dropping path separators and characters that are
/// awkward in URLs while preserving the extension.
fn sanitize_filename(filename: &str) -> String {
    let safe_chars: String = filename
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || "-_.".contains(*c))
        .take(128)
        .collect();

    let safe_chars = safe_chars.trim_start_matches('.');
    if safe_chars.is_empty() {
        "image".to_string()
    } else {
        safe_chars.to_string()
    }
}

/// Generates a per-request identifier used to correlate log lines.
pub fn generate_request_id() -> String {
    let uuid_part = Uuid::new_v4().to_string();
    let timestamp = Utc::now().timestamp_millis();
    format!("{}-{}", timestamp, uuid_part)
}

/// Renders `value` in lowercase base 36.
pub fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Joins a base URL and a path without doubling or dropping the slash.
pub fn api_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Public URL under which this worker serves the object stored at `key`.
pub fn image_url(base_url: &str, key: &str) -> String {
    api_url(base_url, &format!("{}/{}", IMAGES_ROUTE_PREFIX, key))
}

/// Stable wire form of a timestamp.
pub fn serialize_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

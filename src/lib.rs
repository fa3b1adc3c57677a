//! # Storefront Images - Cloudflare Workers
//!
//! Image upload service for the storefront's product editor, built with Rust
//! and Cloudflare Workers. Product images are stored in R2; configuration
//! lives in KV.
//!
//! ## Architecture
//!
//! - **Router**: Routes incoming requests to appropriate handlers
//! - **Middleware**: CORS/security headers and the image validation rule
//! - **Handlers**: Unpack HTTP requests and drive the uploader
//! - **Uploader**: The batch upload orchestrator
//! - **Storage**: The storage seam and its R2 implementation
//! - **Owner**: Persistent and temporary product identifiers
//! - **Models**: Data structures and types
//! - **Utils**: Key generation, identifiers and formatting helpers
//!
//! ## Core Features
//!
//! - Multi-file batches, uploaded one file at a time in selection order
//! - JPEG/PNG/WebP only, with a configurable size ceiling
//! - Per-product image limit with partial-failure reporting
//! - Temporary owners for products that are still being created
//!
//! ## Example Usage
//!
//! ```text
//! GET  /v1/images/limits   - Accepted types, size and count
//! POST /v1/images/upload   - Upload a batch (multipart form)
//! POST /v1/images/remove   - Remove one image from a list
//! GET  /v1/images/{key}    - Serve a stored image
//! ```

use std::sync::{Arc, OnceLock};
use worker::*;

mod config;
mod constants;
mod errors;
mod handlers;
mod logging;
mod middleware;
mod models;
mod owner;
mod router;
mod storage;
mod uploader;
mod utils;

use config::Config;
use constants::STORAGE_CONFIG_KV_NAME;
use logging::Logger;
use utils::generate_request_id;

static CONFIG_CACHE: OnceLock<Arc<Config>> = OnceLock::new();

/// Main entry point for the Cloudflare Worker.
///
/// Sets up panic reporting, loads configuration (cached after the first
/// request) and hands the request to the router.
#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    // Set up panic hook for better error reporting in development
    console_error_panic_hook::set_once();

    let logger = Logger::new(generate_request_id());
    let config = load_config(&env).await?;

    router::handle_request(req, env, config, &logger).await
}

async fn load_config(env: &Env) -> Result<Arc<Config>> {
    if let Some(config) = CONFIG_CACHE.get() {
        return Ok(config.clone());
    }

    let kv = env.kv(STORAGE_CONFIG_KV_NAME)?;
    let config = Arc::new(Config::load(&kv).await?);
    let _ = CONFIG_CACHE.set(config.clone());
    Ok(config)
}

//! # Request Routing and Dispatch
//!
//! Pattern-based routing on HTTP method and URL path.
//!
//! ## Supported Routes
//!
//! - `GET /health` - Health check endpoint
//! - `GET /v1/images/limits` - What the upload area accepts
//! - `POST /v1/images/upload` - Upload a batch of images
//! - `POST /v1/images/remove` - Remove one image from a list
//! - `GET /v1/images/{key}` - Serve a stored image
//! - `OPTIONS *` - CORS preflight requests

use std::sync::Arc;
use worker::*;

use crate::config::Config;
use crate::constants::IMAGES_ROUTE_PREFIX;
use crate::handlers::*;
use crate::logging::Logger;
use crate::middleware::CorsMiddleware;

/// Handles incoming HTTP requests and routes them to appropriate handlers.
///
/// # Route Patterns
///
/// - **Health Check**: `GET /health` → `handle_health_check`
/// - **Image Operations**: `/v1/images/*` → `handle_image_routes`
/// - **CORS Preflight**: `OPTIONS *` → `CorsMiddleware::handle_preflight`
/// - **Unmatched**: `* *` → `handle_not_found`
pub async fn handle_request(
    req: Request,
    env: Env,
    config: Arc<Config>,
    logger: &Logger,
) -> Result<Response> {
    // Handle CORS preflight requests early to avoid unnecessary processing
    if req.method() == Method::Options {
        return CorsMiddleware::handle_preflight();
    }

    let url = req.url()?;
    let path = url.path();
    let method = req.method();

    logger.info(
        "Routing request",
        crate::log_data!("method" => format!("{:?}", method), "path" => path),
    );

    match (method, path) {
        (Method::Get, "/health") => handle_health_check(req, env).await,

        (Method::Get | Method::Post, path) if is_image_route(path) => {
            handle_image_routes(req, env, config, logger).await
        }

        _ => handle_not_found(req, env).await,
    }
}

fn is_image_route(path: &str) -> bool {
    path == IMAGES_ROUTE_PREFIX
        || path
            .strip_prefix(IMAGES_ROUTE_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

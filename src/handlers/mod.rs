//! # Handlers Module
//!
//! This module contains HTTP request handlers for the image upload service.
//! All handlers return `AppResult` and are converted to responses here, so
//! errors and successes leave the worker with the same headers.

use std::sync::Arc;
use worker::*;

use crate::config::Config;
use crate::constants::IMAGES_ROUTE_PREFIX;
use crate::errors::AppResult;
use crate::log_data;
use crate::logging::Logger;
use crate::middleware::CorsMiddleware;
use crate::utils::serialize_date;

pub mod images;

/// Handles all image operations.
pub async fn handle_image_routes(
    req: Request,
    env: Env,
    config: Arc<Config>,
    logger: &Logger,
) -> Result<Response> {
    use images::{get_limits, remove_image_handler, serve_image, upload_images};

    let method = req.method();
    let url = req.url()?;
    let path = url.path().to_string();

    let upload_path = format!("{IMAGES_ROUTE_PREFIX}/upload");
    let remove_path = format!("{IMAGES_ROUTE_PREFIX}/remove");
    let limits_path = format!("{IMAGES_ROUTE_PREFIX}/limits");

    let result: AppResult<Response> = match method {
        Method::Post if path == upload_path => upload_images(req, &env, &config, logger).await,
        Method::Post if path == remove_path => remove_image_handler(req).await,
        Method::Get if path == limits_path => get_limits(&config),
        Method::Get => serve_image(&path, &env, &config).await,
        _ => return handle_not_found(req, env).await,
    };

    match result {
        Ok(response) => CorsMiddleware::apply_headers(response),
        Err(app_error) => {
            let status = app_error.status_code();
            let data = log_data!("path" => path, "status" => status, "error" => app_error.to_string());
            if status >= 500 {
                logger.error("Request failed", data);
            } else {
                logger.warn("Request rejected", data);
            }
            match app_error.to_response() {
                Ok(response) => CorsMiddleware::apply_headers(response),
                Err(_) => CorsMiddleware::apply_headers(Response::error("Internal Server Error", 500)?),
            }
        }
    }
}

/// Provides a health check endpoint for monitoring and load balancer probes.
pub async fn handle_health_check(_req: Request, _env: Env) -> Result<Response> {
    CorsMiddleware::apply_headers(Response::from_json(&serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": serialize_date(&chrono::Utc::now())
    }))?)
}

/// Handles requests to unmatched routes with a 404 Not Found response.
pub async fn handle_not_found(_req: Request, _env: Env) -> Result<Response> {
    CorsMiddleware::apply_headers(Response::error("Not Found", 404)?)
}

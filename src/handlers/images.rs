//! # Image Handlers
//!
//! HTTP handlers for the image workflow. The upload handler unpacks a
//! multipart batch, runs the orchestrator against R2 and reports back the
//! updated image list together with the flat error list.
//!
//! ## Core Operations
//!
//! - **Upload**: Validate and store a batch of images for one product
//! - **Remove**: Drop one entry from an image list
//! - **Limits**: Describe what the upload area accepts
//! - **Serve**: Stream a stored image back from R2

use worker::*;

use crate::config::Config;
use crate::constants::{
    FIELD_FILES, FIELD_IMAGES, FIELD_MAX_IMAGES, FIELD_PRODUCT_ID, IMAGES_ROUTE_PREFIX,
};
use crate::errors::{AppError, AppResult};
use crate::log_data;
use crate::logging::Logger;
use crate::models::{
    BatchOutcome, ImageFile, ImageList, RemoveImageRequest, UploadLimits, UploadReport,
};
use crate::owner::OwnerSlot;
use crate::storage::R2ImageStorage;
use crate::uploader::{remove_image, ImageUploader};

/// Upload a batch of images
pub async fn upload_images(
    mut req: Request,
    env: &Env,
    config: &Config,
    logger: &Logger,
) -> AppResult<Response> {
    let form = req.form_data().await.map_err(|_| AppError::BadRequest {
        message: "Expected multipart form data".to_string(),
    })?;

    let images = parse_image_list(field_value(&form, FIELD_IMAGES).as_deref())?;
    let max_images = resolve_max_images(field_value(&form, FIELD_MAX_IMAGES).as_deref(), config)?;

    // A worker request is always the interactive pass.
    let mut owner_slot = OwnerSlot::new(field_value(&form, FIELD_PRODUCT_ID));
    let owner = owner_slot.mount();

    let files = collect_files(&form).await?;
    logger.info(
        "Upload batch received",
        log_data!("owner" => owner.as_str(), "files" => files.len(), "max_images" => max_images),
    );

    let bucket = env.bucket(&config.bucket_name)?;
    let storage = R2ImageStorage::new(bucket, config);
    let mut uploader = ImageUploader::new(&storage, config, logger.clone());

    let mut updated = None;
    let outcome = uploader
        .handle_file_select(files, &images, max_images, &owner, |list| {
            updated = Some(list)
        })
        .await;

    match outcome {
        BatchOutcome::AtCapacity { notice } => Err(AppError::AtCapacity { notice }),
        BatchOutcome::Completed { errors, .. } => {
            let report = UploadReport {
                images: updated.unwrap_or(images),
                errors,
                owner_id: owner.to_string(),
            };
            Ok(Response::from_json(&report)?)
        }
    }
}

/// Remove one image from a list
pub async fn remove_image_handler(mut req: Request) -> AppResult<Response> {
    let body: RemoveImageRequest = req.json().await.map_err(|_| AppError::BadRequest {
        message: "Invalid JSON in request body".to_string(),
    })?;

    let images = remove_image(&body.images, body.index);
    Ok(Response::from_json(&ImageList { images })?)
}

/// Describe the accepted files
pub fn get_limits(config: &Config) -> AppResult<Response> {
    Ok(Response::from_json(&upload_limits(config))?)
}

/// Stream a stored image
pub async fn serve_image(path: &str, env: &Env, config: &Config) -> AppResult<Response> {
    let key = image_key_from_path(path)?;
    let bucket = env.bucket(&config.bucket_name)?;
    R2ImageStorage::new(bucket, config).serve(key).await
}

fn upload_limits(config: &Config) -> UploadLimits {
    UploadLimits {
        allowed_mime_types: config.allowed_mime_types.clone(),
        max_file_size: config.max_file_size,
        max_images: config.max_images,
        help_text: config.help_text(config.max_images),
    }
}

fn field_value(form: &FormData, name: &str) -> Option<String> {
    match form.get(name) {
        Some(FormEntry::Field(value)) => Some(value),
        _ => None,
    }
}

async fn collect_files(form: &FormData) -> AppResult<Vec<ImageFile>> {
    let entries = form.get_all(FIELD_FILES).ok_or_else(|| AppError::MissingField {
        field: FIELD_FILES.to_string(),
    })?;
    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        if let FormEntry::File(file) = entry {
            let data = file.bytes().await?;
            files.push(ImageFile {
                name: file.name(),
                size: file.size() as u64,
                content_type: file.type_(),
                data,
            });
        }
    }
    Ok(files)
}

/// Parses the current image list. A missing or blank field is an empty list.
fn parse_image_list(raw: Option<&str>) -> AppResult<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| AppError::InvalidField {
            field: FIELD_IMAGES.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Requested limit, capped by the configured one.
fn resolve_max_images(raw: Option<&str>, config: &Config) -> AppResult<usize> {
    let requested = match raw.map(str::trim) {
        None | Some("") => return Ok(config.max_images),
        Some(value) => value.parse::<usize>().map_err(|_| AppError::InvalidField {
            field: FIELD_MAX_IMAGES.to_string(),
            reason: "Must be a valid number".to_string(),
        })?,
    };
    Ok(requested.min(config.max_images))
}

fn image_key_from_path(path: &str) -> AppResult<&str> {
    path.strip_prefix(IMAGES_ROUTE_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty() && !key.split('/').any(|part| part == ".." || part.is_empty()))
        .ok_or_else(|| AppError::NotFound(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_list_defaults_to_empty() {
        assert!(parse_image_list(None).unwrap().is_empty());
        assert!(parse_image_list(Some("  ")).unwrap().is_empty());
        assert_eq!(
            parse_image_list(Some(r#"["a","b"]"#)).unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn image_list_rejects_garbage() {
        let err = parse_image_list(Some("a,b")).unwrap_err();
        assert!(matches!(err, AppError::InvalidField { .. }));
    }

    #[test]
    fn max_images_is_capped_by_config() {
        let config = Config::default();
        assert_eq!(resolve_max_images(None, &config).unwrap(), 5);
        assert_eq!(resolve_max_images(Some("3"), &config).unwrap(), 3);
        assert_eq!(resolve_max_images(Some("50"), &config).unwrap(), 5);
        assert!(resolve_max_images(Some("veel"), &config).is_err());
    }

    #[test]
    fn image_keys_come_from_the_path() {
        assert_eq!(
            image_key_from_path("/v1/images/products/p1/a.png").unwrap(),
            "products/p1/a.png"
        );
        assert!(image_key_from_path("/v1/images/").is_err());
        assert!(image_key_from_path("/v1/images/products/../secret").is_err());
        assert!(image_key_from_path("/v1/other/a.png").is_err());
    }

    #[test]
    fn limits_reflect_config() {
        let limits = upload_limits(&Config::default());
        assert_eq!(limits.max_images, 5);
        assert_eq!(limits.max_file_size, 5 * 1024 * 1024);
        assert_eq!(limits.help_text, "JPG, PNG, WebP tot 5MB. Maximaal 5 afbeeldingen.");
    }
}

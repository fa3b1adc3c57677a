use serde_json::json;
use thiserror::Error;
use worker::{Error as WorkerError, Response};

use crate::constants::{MSG_UNSUPPORTED_TYPE, MSG_UPLOAD_FAILED};

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
    #[error("Bad request: {message}")]
    BadRequest { message: String },
    #[error("Missing field: {field}")]
    MissingField { field: String },
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("{notice}")]
    AtCapacity { notice: String },
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Worker(_) => 500,
            AppError::BadRequest { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidField { .. } => 400,
            AppError::AtCapacity { .. } => 409,
            AppError::NotFound(_) => 404,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            AppError::AtCapacity { notice } => json!({ "notice": notice }),
            other => json!({ "error": other.to_string() }),
        }
    }

    pub fn to_response(&self) -> worker::Result<Response> {
        Ok(Response::from_json(&self.body())?.with_status(self.status_code()))
    }
}

impl From<AppError> for WorkerError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Worker(e) => e,
            other => WorkerError::RustError(other.to_string()),
        }
    }
}

/// Why a file was rejected before any storage call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("{}", MSG_UNSUPPORTED_TYPE)]
    UnsupportedType { content_type: String },
    #[error("Bestand is te groot (maximaal {max_mb}MB)")]
    TooLarge { size: u64, max_mb: u64 },
}

/// Failure reported by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The store answered with an explicit error description.
    #[error("{0}")]
    Rejected(String),
    /// The call itself blew up; details are logged, not shown.
    #[error("storage fault: {0}")]
    Fault(String),
}

impl StorageError {
    /// Reason shown next to the file name.
    pub fn user_reason(&self) -> &str {
        match self {
            StorageError::Rejected(message) => message,
            StorageError::Fault(_) => MSG_UPLOAD_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_maps_to_conflict() {
        let err = AppError::AtCapacity {
            notice: "vol".to_string(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.body(), json!({ "notice": "vol" }));
    }

    #[test]
    fn field_errors_are_bad_requests() {
        let err = AppError::MissingField {
            field: "files".to_string(),
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Missing field: files");
    }

    #[test]
    fn fault_hides_details_from_users() {
        let fault = StorageError::Fault("TypeError: undefined".to_string());
        assert_eq!(fault.user_reason(), "Upload mislukt");
        let rejected = StorageError::Rejected("quota exceeded".to_string());
        assert_eq!(rejected.user_reason(), "quota exceeded");
    }

    #[test]
    fn size_reason_names_the_ceiling() {
        let failure = ValidationFailure::TooLarge { size: 9, max_mb: 5 };
        assert_eq!(failure.to_string(), "Bestand is te groot (maximaal 5MB)");
    }
}

//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Pricing(PricingError::InvalidRange { .. }) => StatusCode::BAD_REQUEST,
            AppError::Pricing(PricingError::PropertyNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Pricing(PricingError::Configuration { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Pricing(PricingError::Repository(_)) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::BadRequest(msg) => PricingErrorResponse {
                error_type: "invalid_request".to_string(),
                message: msg.clone(),
                details: None,
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                PricingErrorResponse {
                    error_type: "database_error".to_string(),
                    message: "Database error".to_string(),
                    details: None,
                }
            }
            AppError::Pricing(PricingError::Repository(msg)) => {
                tracing::error!("Repository error: {}", msg);
                PricingErrorResponse {
                    error_type: "repository_error".to_string(),
                    message: "Storage unavailable".to_string(),
                    details: None,
                }
            }
            AppError::Pricing(err) => {
                let details = match err {
                    PricingError::Configuration { errors, .. } => {
                        tracing::warn!("Pricing configuration error: {}", err);
                        Some(serde_json::json!({ "errors": errors }))
                    }
                    _ => None,
                };
                PricingErrorResponse {
                    error_type: err.kind().to_string(),
                    message: err.to_string(),
                    details,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

//! Unified error handling with Sentry integration.
//!
//! Server errors are captured to Sentry before the response is written, as
//! in the storefront. Unlike the storefront, the response body echoes the
//! underlying error text: the only client here is the back-office, and an
//! admin staring at a failed save needs the store's actual complaint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use maison_core::product::ProductWriteError;

use crate::db::RepositoryError;
use crate::services::background_removal::BackgroundRemovalError;

/// Application-level error type for the back-office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// A product write failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ProductWriteError),

    /// Background removal failed or is unavailable.
    #[error("Background removal error: {0}")]
    BackgroundRemoval(#[from] BackgroundRemovalError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackgroundRemoval(err) => match err {
                BackgroundRemovalError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Trusted audience: store failures keep their repository error text.
        let message = match &self {
            Self::BackgroundRemoval(err) => match err {
                BackgroundRemovalError::Unavailable => {
                    "Background removal is unavailable right now; the original image was kept."
                        .to_string()
                }
                _ => "Background removal failed for this image.".to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_failures_echo_the_repository_error() {
        let error = AppError::Database(RepositoryError::Database(sqlx::Error::PoolClosed));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("database error"));
        assert!(text.contains(&sqlx::Error::PoolClosed.to_string()));
    }

    #[tokio::test]
    async fn test_data_corruption_is_named_in_the_body() {
        let error = AppError::Database(RepositoryError::DataCorruption(
            "order 7: unknown status 'cancelled'".to_owned(),
        ));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        assert!(String::from_utf8_lossy(&body).contains("unknown status 'cancelled'"));
    }

    #[tokio::test]
    async fn test_removal_exhaustion_keeps_the_original_image_message() {
        let error = AppError::BackgroundRemoval(BackgroundRemovalError::Unavailable);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        assert!(String::from_utf8_lossy(&body).contains("original image was kept"));
    }
}

//! API error handling
//!
//! Every AJAX answer uses the `{success, data}` envelope. Request-level
//! failures answer 200 so the widget reads `data.message`; only token and
//! admin-auth failures change the status code.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Message shown in place of internal failure details
const GENERIC_ERROR: &str = "An error occurred processing your request";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation or provider failure
    #[error(transparent)]
    Request(#[from] ApplicationError),

    /// Missing, expired or forged anti-forgery token
    #[error("Security check failed")]
    InvalidNonce,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),
}

/// Response envelope shared by all AJAX endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Payload of a failed envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Short message for the end user
    pub message: String,
    /// Machine-readable error kind
    pub code: String,
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Request(_) => StatusCode::OK,
            Self::InvalidNonce | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::Request(e) => e.code(),
            Self::InvalidNonce => "invalid_nonce",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
        }
    }

    fn message(&self) -> String {
        match self {
            // Internal details stay in the log
            Self::Request(
                e @ (ApplicationError::Internal(_) | ApplicationError::Configuration(_)),
            ) => {
                error!(error = %e, "Request failed");
                GENERIC_ERROR.to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            success: false,
            data: ErrorData {
                message: self.message(),
                code: self.code().to_string(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use domain::GeocodingError;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Envelope<ErrorData>) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn provider_errors_use_ok_status() {
        let (status, body) = render(ApiError::from(ApplicationError::from(
            GeocodingError::ApiError("Over query limit".to_string()),
        )))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert_eq!(body.data.message, "Over query limit");
        assert_eq!(body.data.code, "api_error");
    }

    #[tokio::test]
    async fn invalid_nonce_is_forbidden() {
        let (status, body) = render(ApiError::InvalidNonce).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.data.message, "Security check failed");
        assert_eq!(body.data.code, "invalid_nonce");
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let (status, body) = render(ApiError::from(ApplicationError::Internal(
            "pool exhausted at /var/run".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.message, GENERIC_ERROR);
        assert_eq!(body.data.code, "internal");
    }

    #[tokio::test]
    async fn unauthorized_status() {
        let (status, body) = render(ApiError::Unauthorized("Missing token".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.data.message, "Missing token");
    }

    #[test]
    fn success_envelope_serializes() {
        let json = serde_json::to_value(Envelope::ok(serde_json::json!({"results": []}))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": {"results": []}})
        );
    }
}

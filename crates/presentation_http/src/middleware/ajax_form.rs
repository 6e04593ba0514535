//! Form extraction for the AJAX endpoints
//!
//! Wraps axum's `Form` so bodies that cannot be read answer with the
//! standard error envelope instead of a plain-text rejection.

use application::ApplicationError;
use axum::{
    Form,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Message for bodies that are not a usable form submission
pub const INVALID_REQUEST: &str = "Invalid request";

/// A form-encoded body whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AjaxForm<T>(pub T);

impl<T, S> FromRequest<S> for AjaxForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(
                    status = %rejection.status(),
                    reason = %rejection.body_text(),
                    "Unreadable form body"
                );
                Err(ApiError::Request(ApplicationError::InvalidInput(
                    INVALID_REQUEST.to_string(),
                )))
            },
        }
    }
}

//! Admin token authentication middleware
//!
//! Guards the admin endpoints with a Bearer token compared in constant
//! time. Without a configured token every admin request is refused.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tower::{Layer, Service};
use tracing::warn;

use crate::error::ApiError;

/// Layer that applies admin token authentication
#[derive(Clone)]
pub struct AdminAuthLayer {
    token: Option<Arc<str>>,
}

impl std::fmt::Debug for AdminAuthLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuthLayer")
            .field("enabled", &self.token.is_some())
            .finish()
    }
}

impl AdminAuthLayer {
    /// Create a layer accepting `token`; `None` or blank disables admin access
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()).map(Arc::from),
        }
    }

    /// Layer that refuses every request
    pub const fn disabled() -> Self {
        Self { token: None }
    }
}

impl<S> Layer<S> for AdminAuthLayer {
    type Service = AdminAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminAuth {
            inner,
            token: self.token.clone(),
        }
    }
}

/// Middleware service for admin token authentication
#[derive(Clone)]
pub struct AdminAuth<S> {
    inner: S,
    token: Option<Arc<str>>,
}

impl<S> std::fmt::Debug for AdminAuth<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("enabled", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request> for AdminAuth<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let token = self.token.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(expected) = token else {
                return Ok(ApiError::Forbidden("Admin endpoints are disabled".to_string())
                    .into_response());
            };

            match check_bearer(&req, &expected) {
                Ok(()) => inner.call(req).await,
                Err(e) => {
                    warn!(path = %req.uri().path(), error = %e, "Rejected admin request");
                    Ok(e.into_response())
                },
            }
        })
    }
}

fn check_bearer(req: &Request, expected: &str) -> Result<(), ApiError> {
    let Some(header) = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(ApiError::Unauthorized(
            "Missing Authorization header".to_string(),
        ));
    };

    let Some(provided) = header.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized(
            "Invalid authorization format, expected Bearer token".to_string(),
        ));
    };

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Invalid admin token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use tower::ServiceExt;

    use super::*;

    async fn test_handler() -> &'static str {
        "ok"
    }

    fn router(layer: AdminAuthLayer) -> Router {
        Router::new()
            .route("/admin/clear-cache", post(test_handler))
            .layer(layer)
    }

    async fn status(layer: AdminAuthLayer, auth: Option<&str>) -> StatusCode {
        let mut request = Request::builder().method("POST").uri("/admin/clear-cache");
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth);
        }
        router(layer)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn valid_token_passes() {
        let layer = AdminAuthLayer::new(Some("s3cret"));
        assert_eq!(status(layer, Some("Bearer s3cret")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_token_is_forbidden() {
        let layer = AdminAuthLayer::new(Some("s3cret"));
        assert_eq!(
            status(layer, Some("Bearer s3cre")).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let layer = AdminAuthLayer::new(Some("s3cret"));
        assert_eq!(status(layer, None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_is_unauthorized() {
        let layer = AdminAuthLayer::new(Some("s3cret"));
        assert_eq!(
            status(layer, Some("Basic dXNlcjpwYXNz")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn disabled_refuses_everything() {
        assert_eq!(
            status(AdminAuthLayer::disabled(), Some("Bearer anything")).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(AdminAuthLayer::new(Some("  ")), Some("Bearer   ")).await,
            StatusCode::FORBIDDEN
        );
    }
}

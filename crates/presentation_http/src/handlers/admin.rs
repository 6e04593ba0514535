//! Admin endpoints
//!
//! Mounted behind [`crate::middleware::AdminAuthLayer`].

use application::ProviderInfo;
use axum::{Json, extract::State};
use integration_geocoding::CacheStats;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::{ApiError, Envelope},
    state::AppState,
};

/// Admin action result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageData {
    pub message: String,
}

/// Admin status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusData {
    pub active_provider: String,
    /// `None` when the active provider cannot be constructed
    pub provider: Option<ProviderInfo>,
    pub available_providers: Vec<String>,
    pub cache: CacheStats,
}

/// Validate the active provider against its upstream
#[instrument(skip(state))]
pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<Envelope<MessageData>>, ApiError> {
    let message = state.autocomplete.test_connection().await?;
    Ok(Json(Envelope::ok(MessageData { message })))
}

/// Drop every cached provider response
#[instrument(skip(state))]
pub async fn clear_cache(State(state): State<AppState>) -> Json<Envelope<MessageData>> {
    let message = state.autocomplete.clear_cache().await;
    Json(Envelope::ok(MessageData { message }))
}

/// Provider and cache status
pub async fn status(State(state): State<AppState>) -> Json<Envelope<StatusData>> {
    Json(Envelope::ok(StatusData {
        active_provider: state.registry.active_provider_id(),
        provider: state.autocomplete.provider_info().ok(),
        available_providers: state.registry.available_provider_ids(),
        cache: state.registry.cache().stats(),
    }))
}

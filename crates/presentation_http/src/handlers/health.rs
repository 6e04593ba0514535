//! Liveness endpoint

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Provider id serving autocomplete requests
    pub provider: String,
}

/// Report that the server is up and which provider is active
///
/// Does not contact the provider; use the admin connection test for that.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.registry.active_provider_id(),
    })
}

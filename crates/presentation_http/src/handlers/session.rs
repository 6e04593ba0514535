//! Widget bootstrap endpoint
//!
//! Hands the widget a session id, a nonce for it, and everything it needs
//! to configure itself for the active provider.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::Envelope, nonce::AUTOCOMPLETE_ACTION, state::AppState};

/// Delay between the last keystroke and the search request
pub const SEARCH_DELAY_MS: u64 = 500;

/// Shortest query that triggers a search
pub const MIN_QUERY_LENGTH: usize = 3;

const MAX_SESSION_LEN: usize = 64;

/// Optional existing session to refresh
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

/// UI strings shown by the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetStrings {
    pub searching: String,
    pub no_results: String,
    pub error: String,
}

impl Default for WidgetStrings {
    fn default() -> Self {
        Self {
            searching: "Searching...".to_string(),
            no_results: "No results found".to_string(),
            error: "Error occurred while searching".to_string(),
        }
    }
}

/// Session bootstrap payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session: String,
    pub nonce: String,
    pub provider: String,
    /// Empty when no map can be shown
    pub map_script_url: String,
    pub search_delay_ms: u64,
    pub min_query_length: usize,
    pub strings: WidgetStrings,
}

fn is_valid_session(session: &str) -> bool {
    !session.is_empty()
        && session.len() <= MAX_SESSION_LEN
        && session
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Issue (or refresh) a session and its nonce
pub async fn session(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<Envelope<SessionData>> {
    let session = query
        .session
        .filter(|s| is_valid_session(s))
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let (provider, map_script_url) = state.autocomplete.provider_info().map_or_else(
        |_| (state.registry.active_provider_id(), String::new()),
        |info| (info.id, info.map_script_url),
    );

    Json(Envelope::ok(SessionData {
        nonce: state.nonces.create(AUTOCOMPLETE_ACTION, &session),
        session,
        provider,
        map_script_url,
        search_delay_ms: SEARCH_DELAY_MS,
        min_query_length: MIN_QUERY_LENGTH,
        strings: WidgetStrings::default(),
    }))
}

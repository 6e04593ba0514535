//! Public AJAX endpoints used by the autocomplete widget
//!
//! Both endpoints take form-encoded bodies carrying the session id and the
//! nonce issued by `/ajax/session`.

use axum::{Json, extract::State};
use domain::{PlaceDetails, SearchResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::{ApiError, Envelope},
    middleware::AjaxForm,
    nonce::AUTOCOMPLETE_ACTION,
    state::AppState,
};

/// Search request form
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub session: String,
}

/// Place details request form
#[derive(Debug, Default, Deserialize)]
pub struct PlaceDetailsForm {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub session: String,
}

/// Successful search payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchData {
    pub results: Vec<SearchResult>,
}

/// Successful place details payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailsData {
    pub details: PlaceDetails,
}

fn check_nonce(state: &AppState, nonce: &str, session: &str) -> Result<(), ApiError> {
    if session.is_empty() || !state.nonces.verify(nonce, AUTOCOMPLETE_ACTION, session) {
        debug!("Rejected request with invalid nonce");
        return Err(ApiError::InvalidNonce);
    }
    Ok(())
}

/// Search for places matching the query
#[instrument(skip(state, form))]
pub async fn search(
    State(state): State<AppState>,
    AjaxForm(form): AjaxForm<SearchForm>,
) -> Result<Json<Envelope<SearchData>>, ApiError> {
    check_nonce(&state, &form.nonce, &form.session)?;

    let results = state.autocomplete.search(&form.query).await?;
    Ok(Json(Envelope::ok(SearchData { results })))
}

/// Resolve a place id from a search result into full details
#[instrument(skip(state, form))]
pub async fn place_details(
    State(state): State<AppState>,
    AjaxForm(form): AjaxForm<PlaceDetailsForm>,
) -> Result<Json<Envelope<PlaceDetailsData>>, ApiError> {
    check_nonce(&state, &form.nonce, &form.session)?;

    let details = state.autocomplete.place_details(&form.place_id).await?;
    Ok(Json(Envelope::ok(PlaceDetailsData { details })))
}

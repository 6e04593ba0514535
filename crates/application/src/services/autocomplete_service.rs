//! Autocomplete service
//!
//! Request handling for the public search and details endpoints and for the
//! admin actions. Validates and sanitises input, delegates to the geocoding
//! port and leaves provider errors untouched.

use std::{fmt, sync::Arc};

use domain::{PlaceDetails, SearchResult};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{GeocodingPort, ProviderInfo},
    services::sanitize_text_field,
};

/// Autocomplete service for handling address lookups
pub struct AutocompleteService {
    geocoding: Arc<dyn GeocodingPort>,
}

impl fmt::Debug for AutocompleteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutocompleteService").finish_non_exhaustive()
    }
}

impl AutocompleteService {
    /// Create a new autocomplete service
    pub fn new(geocoding: Arc<dyn GeocodingPort>) -> Self {
        Self { geocoding }
    }

    /// Search for places matching a raw query parameter
    #[instrument(skip(self, raw_query))]
    pub async fn search(&self, raw_query: &str) -> Result<Vec<SearchResult>, ApplicationError> {
        let query = sanitize_text_field(raw_query);
        if query.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "Search query is required".to_string(),
            ));
        }

        let results = self
            .geocoding
            .search(&query)
            .await
            .inspect_err(|e| warn!(query = %query, code = e.code(), error = %e, "Search failed"))?;

        debug!(query = %query, count = results.len(), "Search complete");
        Ok(results)
    }

    /// Resolve a raw place id parameter into full details
    #[instrument(skip(self, raw_place_id))]
    pub async fn place_details(&self, raw_place_id: &str) -> Result<PlaceDetails, ApplicationError> {
        let place_id = sanitize_text_field(raw_place_id);
        if place_id.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "Place ID is required".to_string(),
            ));
        }

        self.geocoding.place_details(&place_id).await.inspect_err(|e| {
            warn!(place_id = %place_id, code = e.code(), error = %e, "Place details failed");
        })
    }

    /// Validate the active provider, returning a confirmation message
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> Result<String, ApplicationError> {
        let provider = self.geocoding.provider_info()?;
        self.geocoding.validate().await?;
        info!(provider = %provider.id, "Provider connection verified");
        Ok("Connection successful!".to_string())
    }

    /// Clear the response cache, returning a summary message
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> String {
        let count = self.geocoding.clear_cache().await;
        clear_cache_message(count)
    }

    /// Describe the active provider
    pub fn provider_info(&self) -> Result<ProviderInfo, ApplicationError> {
        self.geocoding.provider_info()
    }
}

/// Summary for a cache clear, singular for exactly one entry
pub fn clear_cache_message(count: u64) -> String {
    if count == 1 {
        format!("Cleared {count} cache entry")
    } else {
        format!("Cleared {count} cache entries")
    }
}

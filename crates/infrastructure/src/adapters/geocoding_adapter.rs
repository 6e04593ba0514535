//! Geocoding adapter - Implements GeocodingPort using integration_geocoding

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{GeocodingPort, ProviderInfo},
};
use async_trait::async_trait;
use domain::{PlaceDetails, SearchResult};
use integration_geocoding::{GeocodingProvider, ProviderRegistry};
use tracing::{debug, instrument};

/// Adapter that routes every call to the registry's active provider
#[derive(Debug, Clone)]
pub struct GeocodingAdapter {
    registry: Arc<ProviderRegistry>,
}

impl GeocodingAdapter {
    /// Create a new adapter over a provider registry
    pub const fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry
    pub const fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    fn active(&self) -> Result<Arc<dyn GeocodingProvider>, ApplicationError> {
        self.registry.get_provider(None).ok_or_else(|| {
            ApplicationError::ProviderUnavailable("Provider not available".to_string())
        })
    }
}

#[async_trait]
impl GeocodingPort for GeocodingAdapter {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApplicationError> {
        let provider = self.active()?;
        debug!(provider = provider.id(), "Searching");
        Ok(provider.search(query).await?)
    }

    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, ApplicationError> {
        let provider = self.active()?;
        Ok(provider.get_place_details(place_id).await?)
    }

    async fn validate(&self) -> Result<(), ApplicationError> {
        let provider = self.active()?;
        Ok(provider.validate().await?)
    }

    async fn clear_cache(&self) -> u64 {
        self.registry.cache().clear_all().await
    }

    fn provider_info(&self) -> Result<ProviderInfo, ApplicationError> {
        let provider = self.active()?;
        Ok(ProviderInfo {
            id: provider.id().to_string(),
            name: provider.name().to_string(),
            requires_api_key: provider.requires_api_key(),
            map_script_url: provider.map_script_url(),
        })
    }
}

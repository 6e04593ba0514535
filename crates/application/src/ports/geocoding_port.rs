//! Geocoding service port
//!
//! Defines the interface to the active geocoding provider and its cache.

use async_trait::async_trait;
use domain::{PlaceDetails, SearchResult};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Description of the active provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider id (e.g., "openstreetmap")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Whether the provider needs an API key
    pub requires_api_key: bool,
    /// Client map library URL; empty when maps are unavailable
    pub map_script_url: String,
}

/// Port for geocoding operations
///
/// Every operation runs against the provider that is active at call time.
/// Provider errors surface as `ApplicationError::Geocoding`; an active
/// provider that cannot be resolved surfaces as
/// `ApplicationError::ProviderUnavailable`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Find candidate places for a query
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApplicationError>;

    /// Resolve a place id into full details
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, ApplicationError>;

    /// Check that the active provider is configured and reachable
    async fn validate(&self) -> Result<(), ApplicationError>;

    /// Drop every cached response, returning the number removed
    async fn clear_cache(&self) -> u64;

    /// Describe the active provider
    fn provider_info(&self) -> Result<ProviderInfo, ApplicationError>;
}

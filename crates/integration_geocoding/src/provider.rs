//! Geocoding provider trait

use async_trait::async_trait;
use domain::{GeocodingError, PlaceDetails, SearchResult};

/// Trait for geocoding backends
///
/// Implemented by all providers (OpenStreetMap, Google Maps, and any
/// registered at runtime). A `place_id` returned by [`search`] must be
/// accepted by the same provider's [`get_place_details`].
///
/// [`search`]: GeocodingProvider::search
/// [`get_place_details`]: GeocodingProvider::get_place_details
#[async_trait]
pub trait GeocodingProvider: Send + Sync + std::fmt::Debug {
    /// Stable provider id (e.g., "openstreetmap", "google-maps")
    fn id(&self) -> &str;

    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Whether the provider needs an API key to operate
    fn requires_api_key(&self) -> bool;

    /// Find candidate places for a free-text query
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuery` for a blank query, otherwise any upstream or
    /// transport failure.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GeocodingError>;

    /// Resolve a place id from [`GeocodingProvider::search`] into full details
    ///
    /// # Errors
    ///
    /// Returns `InvalidPlaceId` when the id cannot be decoded and
    /// `PlaceNotFound` when the upstream has no such place.
    async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, GeocodingError>;

    /// Check that the provider is configured and reachable
    async fn validate(&self) -> Result<(), GeocodingError>;

    /// URL of the client-side map library; empty when maps are unavailable
    fn map_script_url(&self) -> String;
}

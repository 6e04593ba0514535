//! Place entities returned by geocoding providers

use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// Canonical postal address
///
/// Every provider maps its own component taxonomy into this shape. Missing
/// components are empty strings rather than absent, matching what form
/// fields downstream expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line (house number and road where available)
    #[serde(default)]
    pub street: String,
    /// City, town or village
    #[serde(default)]
    pub city: String,
    /// State, region or first-level administrative area
    #[serde(default)]
    pub state: String,
    /// Postal code
    #[serde(default)]
    pub postal_code: String,
    /// Country name
    #[serde(default)]
    pub country: String,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default)]
    pub country_code: String,
}

impl Address {
    /// Check whether no component is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.postal_code.is_empty()
            && self.country.is_empty()
            && self.country_code.is_empty()
    }
}

/// One autocomplete candidate
///
/// `place_id` is opaque to callers and only meaningful to the provider
/// that produced it; it must be accepted by that provider's details lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Provider-specific place identifier
    pub place_id: String,
    /// Display text for the suggestion list
    pub description: String,
    /// Structured address, when the provider includes it in search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Coordinates, when the provider includes them in search results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

impl SearchResult {
    /// Create a result with only id and description
    pub fn new(place_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            description: description.into(),
            address: None,
            location: None,
        }
    }
}

/// Fully resolved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    /// Provider-specific place identifier
    pub place_id: String,
    /// Formatted address
    pub description: String,
    /// Structured address
    pub address: Address,
    /// Coordinates
    pub location: GeoLocation,
}

impl From<PlaceDetails> for SearchResult {
    fn from(details: PlaceDetails) -> Self {
        Self {
            place_id: details.place_id,
            description: details.description,
            address: Some(details.address),
            location: Some(details.location),
        }
    }
}

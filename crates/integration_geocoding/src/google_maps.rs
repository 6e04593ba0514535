//! Google Maps provider backed by the Places API
//!
//! Uses Place Autocomplete for search and Place Details for resolution.
//! Both endpoints answer HTTP 200 and report failures in a `status` field.

use async_trait::async_trait;
use domain::{Address, GeoLocation, GeocodingError, PlaceDetails, SearchResult};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::{
    cache::GeocodingCache,
    config::GeocodingConfig,
    pipeline::{HttpPipeline, ProviderHooks, RequestParams, decode},
    provider::GeocodingProvider,
};

/// Provider id
pub const GOOGLE_MAPS_ID: &str = "google-maps";

const PROVIDER_NAME: &str = "Google Maps";

/// Places API response structures
mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct AutocompleteResponse {
        pub status: String,
        #[serde(default)]
        pub predictions: Vec<Prediction>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Prediction {
        pub place_id: String,
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct DetailsResponse {
        pub status: String,
        pub result: Option<PlaceResult>,
        pub error_message: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PlaceResult {
        pub place_id: Option<String>,
        #[serde(default)]
        pub formatted_address: String,
        #[serde(default)]
        pub address_components: Vec<AddressComponent>,
        pub geometry: Geometry,
    }

    #[derive(Debug, Deserialize)]
    pub struct AddressComponent {
        pub long_name: String,
        pub short_name: String,
        #[serde(default)]
        pub types: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub location: LatLng,
    }

    #[derive(Debug, Deserialize)]
    pub struct LatLng {
        pub lat: f64,
        pub lng: f64,
    }
}

/// Google Places geocoding provider
#[derive(Debug)]
pub struct GoogleMapsProvider {
    pipeline: HttpPipeline,
    cache: GeocodingCache,
    api_key: Option<SecretString>,
    base_url: String,
    language: String,
    map_script_url: String,
}

impl GoogleMapsProvider {
    /// Create a new Google Places provider
    ///
    /// A missing API key is not an error here; every operation reports
    /// `MissingApiKey` instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        config: &GeocodingConfig,
        cache: GeocodingCache,
        hooks: ProviderHooks,
    ) -> Result<Self, GeocodingError> {
        Ok(Self {
            pipeline: HttpPipeline::new(GOOGLE_MAPS_ID, config, hooks)?,
            cache,
            api_key: config.google_api_key().map(SecretString::from),
            base_url: config.google_maps.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            map_script_url: config.google_maps.map_script_url.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, GeocodingError> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .ok_or_else(|| GeocodingError::missing_api_key(PROVIDER_NAME))
    }

    /// Cache key for a search query, salted with the API key
    fn search_cache_key(&self, query: &str, api_key: &str) -> String {
        GeocodingCache::key("google_search", &[query, &self.language, api_key])
    }

    fn details_cache_key(&self, place_id: &str, api_key: &str) -> String {
        GeocodingCache::key("google_details", &[place_id, &self.language, api_key])
    }

    fn status_error(status: &str, error_message: Option<String>) -> GeocodingError {
        let message = error_message.unwrap_or_else(|| status.to_string());
        warn!(status = %status, message = %message, "Google Places API error");
        GeocodingError::ApiError(message)
    }

    fn to_place_details(
        requested_id: &str,
        place: api::PlaceResult,
    ) -> Result<PlaceDetails, GeocodingError> {
        let location = GeoLocation::new(place.geometry.location.lat, place.geometry.location.lng)?;

        Ok(PlaceDetails {
            place_id: place.place_id.unwrap_or_else(|| requested_id.to_string()),
            description: place.formatted_address,
            address: Self::to_address(&place.address_components),
            location,
        })
    }

    /// Map Google's component taxonomy to the canonical address
    ///
    /// `street_number` is placed before `route` whatever their order.
    fn to_address(components: &[api::AddressComponent]) -> Address {
        let mut address = Address::default();
        let mut number = String::new();
        let mut route = String::new();

        for component in components {
            let has = |kind: &str| component.types.iter().any(|t| t == kind);

            if has("street_number") {
                number.clone_from(&component.long_name);
            } else if has("route") {
                route.clone_from(&component.long_name);
            } else if has("locality") {
                address.city.clone_from(&component.long_name);
            } else if has("administrative_area_level_1") {
                address.state.clone_from(&component.long_name);
            } else if has("postal_code") {
                address.postal_code.clone_from(&component.long_name);
            } else if has("country") {
                address.country.clone_from(&component.long_name);
                address.country_code.clone_from(&component.short_name);
            }
        }

        address.street = format!("{number} {route}").trim().to_string();
        address
    }
}

#[async_trait]
impl GeocodingProvider for GoogleMapsProvider {
    fn id(&self) -> &str {
        GOOGLE_MAPS_ID
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    #[instrument(skip(self), fields(provider = GOOGLE_MAPS_ID))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GeocodingError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodingError::EmptyQuery);
        }
        let api_key = self.api_key()?;

        let cache_key = self.search_cache_key(query, api_key);
        if let Some(cached) = self.cache.get::<Vec<SearchResult>>(&cache_key).await {
            return Ok(cached);
        }

        let params = RequestParams::new()
            .with("input", query)
            .with("key", api_key)
            .with("language", self.language.as_str());

        let body = self
            .pipeline
            .get_json(&format!("{}/place/autocomplete/json", self.base_url), params)
            .await
            .inspect_err(|e| warn!(query = %query, error = %e, "Search request failed"))?;

        let response: api::AutocompleteResponse = decode(body)?;
        if response.status != "OK" && response.status != "ZERO_RESULTS" {
            return Err(Self::status_error(&response.status, response.error_message));
        }

        let results = response
            .predictions
            .into_iter()
            .map(|p| SearchResult::new(p.place_id, p.description))
            .collect();
        let results = self.pipeline.format_results(results);

        debug!(count = results.len(), "Place autocomplete complete");
        self.cache.set(&cache_key, &results, None).await;
        Ok(results)
    }

    #[instrument(skip(self), fields(provider = GOOGLE_MAPS_ID))]
    async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, GeocodingError> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Err(GeocodingError::InvalidPlaceId(String::new()));
        }
        let api_key = self.api_key()?;

        let cache_key = self.details_cache_key(place_id, api_key);
        if let Some(cached) = self.cache.get::<PlaceDetails>(&cache_key).await {
            return Ok(cached);
        }

        let params = RequestParams::new()
            .with("place_id", place_id)
            .with("key", api_key)
            .with("fields", "address_components,formatted_address,geometry,place_id")
            .with("language", self.language.as_str());

        let body = self
            .pipeline
            .get_json(&format!("{}/place/details/json", self.base_url), params)
            .await
            .inspect_err(|e| warn!(place_id = %place_id, error = %e, "Place details request failed"))?;

        let response: api::DetailsResponse = decode(body)?;
        match response.status.as_str() {
            "OK" => {},
            "NOT_FOUND" | "ZERO_RESULTS" => return Err(GeocodingError::PlaceNotFound),
            status => return Err(Self::status_error(status, response.error_message)),
        }

        let place = response.result.ok_or(GeocodingError::PlaceNotFound)?;
        let details = Self::to_place_details(place_id, place)?;

        self.cache.set(&cache_key, &details, None).await;
        Ok(details)
    }

    #[instrument(skip(self), fields(provider = GOOGLE_MAPS_ID))]
    async fn validate(&self) -> Result<(), GeocodingError> {
        let api_key = self.api_key()?;

        let params = RequestParams::new()
            .with("input", "test")
            .with("key", api_key);

        let body = self
            .pipeline
            .get_json(&format!("{}/place/autocomplete/json", self.base_url), params)
            .await
            .map_err(|e| {
                GeocodingError::ApiError(format!("Could not connect to Google Maps API: {e}"))
            })?;

        let response: api::AutocompleteResponse = decode(body)?;
        match response.status.as_str() {
            "REQUEST_DENIED" | "INVALID_REQUEST" => Err(GeocodingError::InvalidApiKey(
                response
                    .error_message
                    .unwrap_or_else(|| "Invalid API key or API not enabled".to_string()),
            )),
            _ => Ok(()),
        }
    }

    fn map_script_url(&self) -> String {
        let Ok(api_key) = self.api_key() else {
            return String::new();
        };

        url::Url::parse_with_params(
            &self.map_script_url,
            &[
                ("key", api_key),
                ("libraries", "places"),
                ("language", self.language.as_str()),
            ],
        )
        .map(String::from)
        .unwrap_or_else(|e| {
            warn!(error = %e, "Invalid Google Maps script URL");
            String::new()
        })
    }
}

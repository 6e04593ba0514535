//! OpenStreetMap provider backed by the Nominatim API
//!
//! Place ids are OSM element ids prefixed with the element type letter
//! (`N`, `W`, `R`); see [`OsmPlaceId`].

use async_trait::async_trait;
use domain::{Address, GeoLocation, GeocodingError, OsmPlaceId, OsmType, PlaceDetails, SearchResult};
use tracing::{debug, instrument, warn};

use crate::{
    cache::GeocodingCache,
    config::GeocodingConfig,
    pipeline::{HttpPipeline, ProviderHooks, RequestParams, decode},
    provider::GeocodingProvider,
};

/// Provider id
pub const OPENSTREETMAP_ID: &str = "openstreetmap";

/// Nominatim API response structures
mod api {
    use serde::Deserialize;

    /// Postcode centroids and other synthetic entries carry no OSM element
    #[derive(Debug, Deserialize)]
    pub struct NominatimPlace {
        pub osm_type: Option<String>,
        pub osm_id: Option<u64>,
        pub lat: String,
        pub lon: String,
        pub display_name: String,
        #[serde(default)]
        pub address: NominatimAddress,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct NominatimAddress {
        pub house_number: Option<String>,
        pub road: Option<String>,
        pub city: Option<String>,
        pub town: Option<String>,
        pub village: Option<String>,
        pub state: Option<String>,
        pub postcode: Option<String>,
        pub country: Option<String>,
        pub country_code: Option<String>,
    }
}

/// Nominatim geocoding provider
#[derive(Debug)]
pub struct OpenStreetMapProvider {
    pipeline: HttpPipeline,
    cache: GeocodingCache,
    base_url: String,
    search_limit: u32,
    language: String,
    map_script_url: String,
}

impl OpenStreetMapProvider {
    /// Create a new Nominatim provider
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
            pipeline: HttpPipeline::new(OPENSTREETMAP_ID, config, hooks)?,
            cache,
            base_url: config.openstreetmap.base_url.trim_end_matches('/').to_string(),
            search_limit: config.openstreetmap.search_limit,
            language: config.language.clone(),
            map_script_url: config.openstreetmap.map_script_url.clone(),
        })
    }

    /// Cache key for a search query
    pub fn search_cache_key(&self, query: &str) -> String {
        GeocodingCache::key(
            "osm_search",
            &[query, &self.language, &self.search_limit.to_string()],
        )
    }

    /// Cache key for a details lookup
    pub fn details_cache_key(&self, place_id: &OsmPlaceId) -> String {
        GeocodingCache::key("osm_details", &[&place_id.to_string(), &self.language])
    }

    fn to_search_result(place: api::NominatimPlace) -> Result<SearchResult, GeocodingError> {
        Ok(Self::to_place_details(place)?.into())
    }

    fn to_place_details(place: api::NominatimPlace) -> Result<PlaceDetails, GeocodingError> {
        let (Some(osm_type), Some(osm_id)) = (place.osm_type.as_deref(), place.osm_id) else {
            return Err(GeocodingError::InvalidResponse(format!(
                "no OSM element for {}",
                place.display_name
            )));
        };
        let osm_type: OsmType = osm_type.parse()?;
        let location = GeoLocation::parse(&place.lat, &place.lon)?;

        Ok(PlaceDetails {
            place_id: OsmPlaceId::new(osm_type, osm_id).to_string(),
            description: place.display_name,
            address: Self::to_address(place.address),
            location,
        })
    }

    fn to_address(address: api::NominatimAddress) -> Address {
        let street = match (address.house_number, address.road) {
            (Some(number), Some(road)) => format!("{number} {road}"),
            (None, Some(road)) => road,
            _ => String::new(),
        };

        Address {
            street,
            city: address
                .city
                .or(address.town)
                .or(address.village)
                .unwrap_or_default(),
            state: address.state.unwrap_or_default(),
            postal_code: address.postcode.unwrap_or_default(),
            country: address.country.unwrap_or_default(),
            country_code: address.country_code.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl GeocodingProvider for OpenStreetMapProvider {
    fn id(&self) -> &str {
        OPENSTREETMAP_ID
    }

    fn name(&self) -> &str {
        "OpenStreetMap"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    #[instrument(skip(self), fields(provider = OPENSTREETMAP_ID))]
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GeocodingError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodingError::EmptyQuery);
        }

        let cache_key = self.search_cache_key(query);
        if let Some(cached) = self.cache.get::<Vec<SearchResult>>(&cache_key).await {
            return Ok(cached);
        }

        let params = RequestParams::new()
            .with("q", query)
            .with("format", "json")
            .with("addressdetails", "1")
            .with("limit", self.search_limit.to_string())
            .with("accept-language", self.language.as_str());

        let body = self
            .pipeline
            .get_json(&format!("{}/search", self.base_url), params)
            .await
            .inspect_err(|e| warn!(query = %query, error = %e, "Search request failed"))?;

        let places: Vec<api::NominatimPlace> = decode(body)?;
        let results: Vec<SearchResult> = places
            .into_iter()
            .filter_map(|place| {
                Self::to_search_result(place)
                    .inspect_err(|e| warn!(error = %e, "Skipping unusable Nominatim entry"))
                    .ok()
            })
            .collect();
        let results = self.pipeline.format_results(results);

        debug!(count = results.len(), "Nominatim search complete");
        self.cache.set(&cache_key, &results, None).await;
        Ok(results)
    }

    #[instrument(skip(self), fields(provider = OPENSTREETMAP_ID))]
    async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, GeocodingError> {
        let osm_place = OsmPlaceId::parse(place_id)?;

        let cache_key = self.details_cache_key(&osm_place);
        if let Some(cached) = self.cache.get::<PlaceDetails>(&cache_key).await {
            return Ok(cached);
        }

        debug!(
            osm_type = %osm_place.osm_type(),
            osm_id = osm_place.osm_id(),
            "Looking up OSM element"
        );

        let params = RequestParams::new()
            .with("osm_ids", osm_place.to_string())
            .with("format", "json")
            .with("addressdetails", "1")
            .with("accept-language", self.language.as_str());

        let body = self
            .pipeline
            .get_json(&format!("{}/lookup", self.base_url), params)
            .await
            .inspect_err(|e| warn!(place_id = %place_id, error = %e, "Place details request failed"))?;

        let places: Vec<api::NominatimPlace> = decode(body)?;
        let place = places
            .into_iter()
            .next()
            .ok_or(GeocodingError::PlaceNotFound)?;
        let details = Self::to_place_details(place)?;

        self.cache.set(&cache_key, &details, None).await;
        Ok(details)
    }

    #[instrument(skip(self), fields(provider = OPENSTREETMAP_ID))]
    async fn validate(&self) -> Result<(), GeocodingError> {
        let params = RequestParams::new()
            .with("q", "test")
            .with("format", "json")
            .with("limit", "1");

        self.pipeline
            .get_json(&format!("{}/search", self.base_url), params)
            .await
            .map(|_| ())
            .map_err(|e| {
                GeocodingError::ApiError(format!("Could not connect to OpenStreetMap API: {e}"))
            })
    }

    fn map_script_url(&self) -> String {
        self.map_script_url.clone()
    }
}

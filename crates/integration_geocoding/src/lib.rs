#![forbid(unsafe_code)]
//! Geocoding providers for address autocomplete
//!
//! Turns free-text address queries into candidate places and resolves a
//! chosen candidate into a full structured address with coordinates.
//!
//! # Architecture
//!
//! Every backend implements [`GeocodingProvider`]. Two ship with the crate:
//! [`OpenStreetMapProvider`] (Nominatim, no credentials) and
//! [`GoogleMapsProvider`] (Places API, API key). Both run the same pipeline:
//! cache lookup, one outbound HTTP call, normalisation into the domain
//! model, cache store. The [`GeocodingCache`] is shared by all providers and
//! namespaces its keys per provider and operation.
//!
//! [`ProviderRegistry`] resolves the configured provider and keeps exactly
//! one instance per provider id for its own lifetime.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_geocoding::{CacheConfig, GeocodingCache, GeocodingConfig, ProviderRegistry};
//!
//! let config = GeocodingConfig::default();
//! let cache = GeocodingCache::new(&CacheConfig::default());
//! let registry = ProviderRegistry::new(config, cache);
//!
//! let provider = registry.get_provider(None).expect("default provider");
//! let results = provider.search("10 Downing Street").await?;
//! let details = provider.get_place_details(&results[0].place_id).await?;
//! ```

mod cache;
mod config;
mod google_maps;
mod openstreetmap;
mod pipeline;
mod provider;
mod registry;

pub use cache::{CacheStats, GeocodingCache};
pub use config::{CacheConfig, GeocodingConfig, GoogleMapsConfig, OpenStreetMapConfig};
pub use domain::GeocodingError;
pub use google_maps::{GOOGLE_MAPS_ID, GoogleMapsProvider};
pub use openstreetmap::{OPENSTREETMAP_ID, OpenStreetMapProvider};
pub use pipeline::{PreRequestHook, ProviderHooks, RequestParams, ResultsHook};
pub use provider::GeocodingProvider;
pub use registry::{ProviderConstructor, ProviderRegistry};

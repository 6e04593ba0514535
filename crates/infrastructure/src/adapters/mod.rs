//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod geocoding_adapter;

pub use geocoding_adapter::GeocodingAdapter;

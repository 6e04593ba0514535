//! Domain entities

mod place;

pub use place::{Address, PlaceDetails, SearchResult};

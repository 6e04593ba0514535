//! Value objects

mod geo_location;
mod osm_place_id;

pub use geo_location::{GeoBounds, GeoLocation};
pub use osm_place_id::{OsmPlaceId, OsmType};

//! Geographic location value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A geographic location with latitude and longitude
///
/// Serialized as `{"lat": .., "lng": ..}`, the shape both map libraries
/// consume on the client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    lat: f64,
    /// Longitude in degrees (-180 to 180)
    lng: f64,
}

#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawLocation> for GeoLocation {
    type Error = DomainError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if either value is not finite,
    /// latitude is not in [-90, 90] or longitude is not in [-180, 180]
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::InvalidCoordinates);
        }
        Ok(Self { lat, lng })
    }

    /// Parse a location from the decimal strings Nominatim returns
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if either string is not a
    /// number or the pair is out of range
    pub fn parse(lat: &str, lng: &str) -> Result<Self, DomainError> {
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::InvalidCoordinates)?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::InvalidCoordinates)?;
        Self::new(lat, lng)
    }

    /// Get the latitude
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Get the longitude
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Smallest latitude/longitude rectangle enclosing a set of locations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// South-west corner
    pub south_west: GeoLocation,
    /// North-east corner
    pub north_east: GeoLocation,
}

impl GeoBounds {
    /// Compute the bounds of the given locations, `None` when empty
    pub fn enclosing<'a>(locations: impl IntoIterator<Item = &'a GeoLocation>) -> Option<Self> {
        let mut iter = locations.into_iter();
        let first = *iter.next()?;
        let (mut south, mut west, mut north, mut east) = (first.lat, first.lng, first.lat, first.lng);
        for loc in iter {
            south = south.min(loc.lat);
            north = north.max(loc.lat);
            west = west.min(loc.lng);
            east = east.max(loc.lng);
        }
        Some(Self {
            south_west: GeoLocation { lat: south, lng: west },
            north_east: GeoLocation { lat: north, lng: east },
        })
    }

    /// Check whether a location lies inside the bounds
    #[must_use]
    pub fn contains(&self, loc: &GeoLocation) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&loc.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&loc.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let loc = GeoLocation::new(51.503_36, -0.127_63).expect("valid coordinates");
        assert!((loc.lat() - 51.503_36).abs() < f64::EPSILON);
        assert!((loc.lng() + 0.127_63).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_coordinates() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());
        assert!(GeoLocation::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(GeoLocation::new(91.0, 0.0).is_err());
        assert!(GeoLocation::new(0.0, -181.0).is_err());
        assert!(GeoLocation::new(f64::NAN, 0.0).is_err());
        assert!(GeoLocation::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_from_strings() {
        let loc = GeoLocation::parse("51.5033635", "-0.1276248").expect("valid");
        assert!((loc.lat() - 51.503_363_5).abs() < 1e-9);

        assert_eq!(
            GeoLocation::parse("north", "0"),
            Err(DomainError::InvalidCoordinates)
        );
        assert_eq!(
            GeoLocation::parse("95.0", "0"),
            Err(DomainError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_serializes_as_lat_lng() {
        let loc = GeoLocation::new(48.8566, 2.3522).expect("valid");
        let json = serde_json::to_value(loc).expect("serialize");
        assert_eq!(json, serde_json::json!({"lat": 48.8566, "lng": 2.3522}));

        let back: GeoLocation = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, loc);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let result: Result<GeoLocation, _> =
            serde_json::from_value(serde_json::json!({"lat": 120.0, "lng": 0.0}));
        assert!(result.is_err());
    }

    #[test]
    fn test_bounds_enclose_all_points() {
        let points = [
            GeoLocation::new(48.85, 2.35).expect("valid"),
            GeoLocation::new(51.50, -0.12).expect("valid"),
            GeoLocation::new(52.52, 13.40).expect("valid"),
        ];
        let bounds = GeoBounds::enclosing(&points).expect("non-empty");
        assert!((bounds.south_west.lat() - 48.85).abs() < f64::EPSILON);
        assert!((bounds.south_west.lng() + 0.12).abs() < f64::EPSILON);
        assert!((bounds.north_east.lat() - 52.52).abs() < f64::EPSILON);
        assert!((bounds.north_east.lng() - 13.40).abs() < f64::EPSILON);
        assert!(points.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn test_bounds_of_nothing() {
        assert!(GeoBounds::enclosing(&[]).is_none());
    }
}

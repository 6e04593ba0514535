//! OpenStreetMap place identifier
//!
//! OSM numbers nodes, ways and relations in independent sequences, so a bare
//! numeric id is ambiguous. Place ids handed to the client therefore carry the
//! entity type as a one-letter prefix: `N123`, `W123`, `R123`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// OSM entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    /// A single point
    Node,
    /// An ordered list of nodes
    Way,
    /// A group of other elements
    Relation,
}

impl OsmType {
    /// Prefix letter used in encoded place ids
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Node => 'N',
            Self::Way => 'W',
            Self::Relation => 'R',
        }
    }

    /// Decode a prefix letter
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'N' => Some(Self::Node),
            'W' => Some(Self::Way),
            'R' => Some(Self::Relation),
            _ => None,
        }
    }

    /// Name used by the Nominatim API (`node`, `way`, `relation`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl FromStr for OsmType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" | "n" => Ok(Self::Node),
            "way" | "w" => Ok(Self::Way),
            "relation" | "r" => Ok(Self::Relation),
            _ => Err(DomainError::ValidationError(format!(
                "Unknown OSM type: {s}"
            ))),
        }
    }
}

impl fmt::Display for OsmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed OSM place id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsmPlaceId {
    osm_type: OsmType,
    osm_id: u64,
}

impl OsmPlaceId {
    /// Create a place id from its parts
    #[must_use]
    pub const fn new(osm_type: OsmType, osm_id: u64) -> Self {
        Self { osm_type, osm_id }
    }

    /// Decode an encoded place id such as `W12345`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPlaceId` if the prefix letter is not one of
    /// `N`, `W`, `R` or the remainder is not a positive integer
    pub fn parse(encoded: &str) -> Result<Self, DomainError> {
        let encoded = encoded.trim();
        let mut chars = encoded.chars();
        let osm_type = chars
            .next()
            .and_then(OsmType::from_letter)
            .ok_or_else(|| DomainError::InvalidPlaceId(encoded.to_string()))?;
        let osm_id = chars
            .as_str()
            .parse::<u64>()
            .map_err(|_| DomainError::InvalidPlaceId(encoded.to_string()))?;
        Ok(Self { osm_type, osm_id })
    }

    /// Entity type
    #[must_use]
    pub const fn osm_type(&self) -> OsmType {
        self.osm_type
    }

    /// Numeric id within the entity type's sequence
    #[must_use]
    pub const fn osm_id(&self) -> u64 {
        self.osm_id
    }
}

impl FromStr for OsmPlaceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OsmPlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.osm_type.letter(), self.osm_id)
    }
}

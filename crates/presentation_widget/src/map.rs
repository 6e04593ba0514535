//! Map update planning
//!
//! A map container lists the address fields it follows. Whenever one of
//! them gets new place details, the map is redrawn from a [`MapPlan`]: one
//! marker per located field, an optional route line through them, and the
//! bounds to fit the viewport to.

use std::str::FromStr;

use domain::{GeoBounds, GeoLocation, PlaceDetails};
use serde::{Deserialize, Serialize};

/// Initial map center before any place is selected
pub const DEFAULT_CENTER: (f64, f64) = (48.8566, 2.3522);
/// Initial zoom level
pub const DEFAULT_ZOOM: u8 = 13;
/// Stroke colour of route lines
pub const ROUTE_COLOR: &str = "#3388ff";

/// How located fields are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    #[default]
    Markers,
    /// Markers joined by a line in field order
    Route,
}

impl MapMode {
    /// Parse a mode attribute; anything unknown draws markers
    pub fn parse(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markers" | "" => Ok(Self::Markers),
            "route" => Ok(Self::Route),
            other => Err(format!("unknown map mode: {other}")),
        }
    }
}

/// Map rendering library matching the active provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapLibrary {
    /// Tile-based open-source library
    Leaflet { script_url: String },
    /// Commercial map library, needs a credentialed script URL
    GoogleMaps { script_url: String },
}

impl MapLibrary {
    /// Library for `provider`, or `None` when maps must not be initialised
    pub fn for_provider(provider: &str, script_url: &str) -> Option<Self> {
        let script_url = script_url.trim();
        if script_url.is_empty() {
            return None;
        }
        let script_url = script_url.to_string();
        match provider {
            "openstreetmap" => Some(Self::Leaflet { script_url }),
            "google-maps" => Some(Self::GoogleMaps { script_url }),
            _ => None,
        }
    }

    pub fn script_url(&self) -> &str {
        match self {
            Self::Leaflet { script_url } | Self::GoogleMaps { script_url } => script_url,
        }
    }
}

/// Input names a field id may appear under, one per host form convention
pub fn field_name_candidates(field_id: &str) -> [String; 3] {
    [
        format!("input_{field_id}"),
        format!("wpforms[fields][{field_id}]"),
        field_id.to_string(),
    ]
}

/// A marker on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub location: GeoLocation,
    /// Popup text
    pub description: String,
}

/// What a map should show after an update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPlan {
    pub markers: Vec<MapMarker>,
    /// Route line through the markers; empty unless in route mode with
    /// at least two markers
    pub route: Vec<GeoLocation>,
    /// Viewport to fit
    pub bounds: GeoBounds,
}

/// A map container and the fields it follows
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapSpec {
    pub field_ids: Vec<String>,
    #[serde(default)]
    pub mode: MapMode,
}

impl MapSpec {
    /// Build from the container's comma separated field list and mode
    pub fn parse(fields: &str, mode: &str) -> Self {
        Self {
            field_ids: fields
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(ToString::to_string)
                .collect(),
            mode: MapMode::parse(mode),
        }
    }

    /// Plan a redraw from the details stored per field
    ///
    /// `lookup` receives each candidate input name of every field id and
    /// returns the details stored for that input, if any. The first name
    /// that resolves wins. Returns `None` when no field is located, in which
    /// case the map keeps its current view.
    pub fn plan(&self, lookup: impl Fn(&str) -> Option<PlaceDetails>) -> Option<MapPlan> {
        let markers: Vec<MapMarker> = self
            .field_ids
            .iter()
            .filter_map(|id| {
                field_name_candidates(id)
                    .iter()
                    .find_map(|name| lookup(name))
            })
            .map(|details| MapMarker {
                location: details.location,
                description: details.description,
            })
            .collect();

        let bounds = GeoBounds::enclosing(markers.iter().map(|m| &m.location))?;
        let route = if self.mode == MapMode::Route && markers.len() > 1 {
            markers.iter().map(|m| m.location).collect()
        } else {
            Vec::new()
        };

        Some(MapPlan {
            markers,
            route,
            bounds,
        })
    }
}

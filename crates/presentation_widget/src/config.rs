//! Widget configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::SessionInfo;

/// UI strings shown in the suggestion panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetStrings {
    #[serde(default = "default_searching")]
    pub searching: String,
    #[serde(default = "default_no_results")]
    pub no_results: String,
    #[serde(default = "default_error")]
    pub error: String,
}

fn default_searching() -> String {
    "Searching...".to_string()
}

fn default_no_results() -> String {
    "No results found".to_string()
}

fn default_error() -> String {
    "Error occurred while searching".to_string()
}

impl Default for WidgetStrings {
    fn default() -> Self {
        Self {
            searching: default_searching(),
            no_results: default_no_results(),
            error: default_error(),
        }
    }
}

/// Widget configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Pause after the last keystroke before searching
    pub search_delay: Duration,
    /// Shortest trimmed query (in characters) that triggers a search
    pub min_query_length: usize,
    /// Panel strings
    pub strings: WidgetStrings,
    /// Active provider id, selects the map library
    pub provider: String,
    /// Map library URL; empty means maps are not initialised
    pub map_script_url: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            search_delay: Duration::from_millis(500),
            min_query_length: 3,
            strings: WidgetStrings::default(),
            provider: "openstreetmap".to_string(),
            map_script_url: String::new(),
        }
    }
}

impl WidgetConfig {
    /// Configuration handed out by the session endpoint
    pub fn from_session(session: &SessionInfo) -> Self {
        Self {
            search_delay: Duration::from_millis(session.search_delay_ms),
            min_query_length: session.min_query_length,
            strings: session.strings.clone(),
            provider: session.provider.clone(),
            map_script_url: session.map_script_url.clone(),
        }
    }

    /// Create a configuration for testing
    pub fn for_testing() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_behaviour() {
        let config = WidgetConfig::default();
        assert_eq!(config.search_delay, Duration::from_millis(500));
        assert_eq!(config.min_query_length, 3);
        assert_eq!(config.strings.searching, "Searching...");
    }

    #[test]
    fn strings_fill_missing_fields() {
        let strings: WidgetStrings = serde_json::from_str(r#"{"error": "Oops"}"#).unwrap();
        assert_eq!(strings.error, "Oops");
        assert_eq!(strings.no_results, "No results found");
    }

    #[test]
    fn from_session_copies_settings() {
        let session = SessionInfo {
            session: "s".to_string(),
            nonce: "n".to_string(),
            provider: "google-maps".to_string(),
            map_script_url: "https://maps.example/js".to_string(),
            search_delay_ms: 250,
            min_query_length: 4,
            strings: WidgetStrings::default(),
        };
        let config = WidgetConfig::from_session(&session);
        assert_eq!(config.search_delay, Duration::from_millis(250));
        assert_eq!(config.min_query_length, 4);
        assert_eq!(config.provider, "google-maps");
        assert_eq!(config.map_script_url, "https://maps.example/js");
    }
}

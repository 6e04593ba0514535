//! Widget errors

use thiserror::Error;

/// Errors from the autocomplete backend or the widget itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// The server answered with `success: false`; message may be empty
    #[error("{0}")]
    Rejected(String),

    /// The request did not complete
    #[error("Network error: {0}")]
    Network(String),

    /// The server answer could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Selection index outside the displayed suggestions
    #[error("No suggestion at index {0}")]
    NoSuchSuggestion(usize),
}

impl WidgetError {
    /// Message for the suggestion panel, falling back to `generic`
    pub fn panel_message(&self, generic: &str) -> String {
        match self {
            Self::Rejected(message) if !message.trim().is_empty() => message.clone(),
            _ => generic.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_messages_are_shown() {
        let err = WidgetError::Rejected("Place not found".to_string());
        assert_eq!(err.panel_message("Error"), "Place not found");
    }

    #[test]
    fn other_failures_use_generic_message() {
        assert_eq!(WidgetError::Rejected(String::new()).panel_message("Error"), "Error");
        assert_eq!(
            WidgetError::Network("timed out".to_string()).panel_message("Error"),
            "Error"
        );
    }
}

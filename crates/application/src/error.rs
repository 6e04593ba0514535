//! Application-level errors

use domain::GeocodingError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// `Display` is the short message shown to the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Geocoding provider error, passed through unchanged
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    /// Request input missing or unusable
    #[error("{0}")]
    InvalidInput(String),

    /// No provider could be resolved for the configured id
    #[error("{0}")]
    ProviderUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Stable machine-readable code for the error kind
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Geocoding(e) => e.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::Configuration(_) => "configuration",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the failure was caused by the caller's input
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::Geocoding(
                    GeocodingError::EmptyQuery
                        | GeocodingError::InvalidPlaceId(_)
                        | GeocodingError::PlaceNotFound
                )
        )
    }
}

//! Domain-level errors

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Coordinates outside the valid latitude/longitude ranges
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Place identifier that does not follow the provider's encoding
    #[error("Invalid place ID format: {0}")]
    InvalidPlaceId(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Errors produced by geocoding providers
///
/// The variants form the closed taxonomy every backend reports through.
/// They travel unchanged up to the request handler, which renders the
/// `Display` text as the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodingError {
    /// The search query was empty after trimming
    #[error("Search query cannot be empty")]
    EmptyQuery,

    /// The provider requires credentials and none are configured
    #[error("{provider} API key is not configured")]
    MissingApiKey {
        /// Human-readable provider name
        provider: String,
    },

    /// The upstream rejected the configured credentials
    #[error("{0}")]
    InvalidApiKey(String),

    /// The upstream reported a failure; message is passed through
    #[error("{0}")]
    ApiError(String),

    /// The upstream body was not JSON or did not have the expected shape
    #[error("Invalid response from API: {0}")]
    InvalidResponse(String),

    /// The upstream returned no place for the identifier
    #[error("Place not found")]
    PlaceNotFound,

    /// The place identifier could not be decoded
    #[error("Invalid place ID format: {0}")]
    InvalidPlaceId(String),

    /// Transport-level failure, including timeouts
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl GeocodingError {
    /// Create a missing API key error for the named provider
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Stable machine-readable code for the error kind
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty_query",
            Self::MissingApiKey { .. } => "missing_api_key",
            Self::InvalidApiKey(_) => "invalid_api_key",
            Self::ApiError(_) => "api_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::PlaceNotFound => "place_not_found",
            Self::InvalidPlaceId(_) => "invalid_place_id",
            Self::NetworkError(_) => "network_error",
        }
    }
}

impl From<DomainError> for GeocodingError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidPlaceId(id) => Self::InvalidPlaceId(id),
            other => Self::InvalidResponse(other.to_string()),
        }
    }
}

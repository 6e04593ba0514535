//! Domain layer for address autocomplete
//!
//! Contains the place data model shared by every geocoding backend, the
//! value objects that encode provider-specific identifiers, and the error
//! taxonomy surfaced to callers. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::{DomainError, GeocodingError};
pub use value_objects::*;

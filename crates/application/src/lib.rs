//! Application layer - Use cases and orchestration
//!
//! Contains the autocomplete request handling, input sanitisation and the
//! port through which the geocoding backend is reached. Adapters in the
//! infrastructure layer implement the port.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;

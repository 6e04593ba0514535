//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer, loads configuration
//! and sets up logging.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, CacheConfig, GeocodingConfig, SecurityConfig, ServerConfig};
pub use telemetry::{LogFormat, init_tracing};

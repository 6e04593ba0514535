//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `security`: Nonce signing and admin access
//!
//! Geocoding and cache settings are defined next to the providers that
//! consume them and re-exported here.

mod security;
mod server;

pub use integration_geocoding::{CacheConfig, GeocodingConfig};
use serde::{Deserialize, Serialize};
pub use security::SecurityConfig;
pub use server::ServerConfig;

/// Environment variable prefix, e.g. `ADDRESS_AUTOCOMPLETE__SERVER__PORT`
pub const ENV_PREFIX: &str = "ADDRESS_AUTOCOMPLETE";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from `config.*` in the working directory and the
    /// environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(config::File::with_name("config").required(false))
    }

    /// Load configuration from an explicit file source and the environment
    ///
    /// Environment variables override file values, e.g.
    /// `ADDRESS_AUTOCOMPLETE__GEOCODING__PROVIDER=google-maps`.
    pub fn load_from<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            // A deployed server listens on all interfaces
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.geocoding
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("geocoding: {e}")))?;

        if self.security.nonce_lifetime_secs < 2 {
            return Err(config::ConfigError::Message(
                "security.nonce_lifetime_secs must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(toml: &str) -> Result<AppConfig, config::ConfigError> {
        AppConfig::load_from(config::File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.shutdown_timeout_secs, 30);
        assert_eq!(config.geocoding.provider, "openstreetmap");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.duration_secs, 86_400);
        assert_eq!(config.security.nonce_lifetime_secs, 86_400);
        assert!(!config.security.admin_enabled());
    }

    #[test]
    fn file_values() {
        let config = from_toml(
            r#"
            [server]
            port = 8080
            log_format = "json"

            [geocoding]
            provider = "google-maps"
            google_maps_api_key = "AIza-test"
            language = "de"

            [cache]
            enabled = false
            duration_secs = 600

            [security]
            admin_token = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_format, "json");
        assert_eq!(config.geocoding.provider, "google-maps");
        assert_eq!(config.geocoding.google_api_key(), Some("AIza-test"));
        assert_eq!(config.geocoding.language, "de");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.duration_secs, 600);
        assert_eq!(config.security.admin_token(), Some("s3cret"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(from_toml("[geocoding]\ntimeout_secs = 0").is_err());
        assert!(from_toml("[security]\nnonce_lifetime_secs = 1").is_err());
    }

    #[test]
    fn blank_admin_token_disables_admin() {
        let config = from_toml("[security]\nadmin_token = \"  \"").unwrap();
        assert!(!config.security.admin_enabled());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let config = from_toml(
            "[geocoding]\ngoogle_maps_api_key = \"AIza-test\"\n[security]\nadmin_token = \"s3cret\"",
        )
        .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("AIza-test"));
        assert!(!json.contains("s3cret"));
    }

    #[test]
    fn bind_address() {
        assert_eq!(ServerConfig::default().bind_address(), "127.0.0.1:3000");
    }
}

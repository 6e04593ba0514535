//! Application state shared across handlers

use std::sync::Arc;

use application::AutocompleteService;
use infrastructure::{AppConfig, GeocodingAdapter};
use integration_geocoding::{GeocodingCache, ProviderRegistry};

use crate::{config_reload::ReloadableConfig, nonce::NonceManager};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Autocomplete service for the AJAX and admin endpoints
    pub autocomplete: Arc<AutocompleteService>,
    /// Provider registry, shared with the config reload handler
    pub registry: Arc<ProviderRegistry>,
    /// Anti-forgery token issuer
    pub nonces: Arc<NonceManager>,
    /// Application configuration (reloadable)
    pub config: ReloadableConfig,
}

impl AppState {
    /// Wire the services around an existing registry
    pub fn new(config: ReloadableConfig, registry: Arc<ProviderRegistry>) -> Self {
        let current = config.load();
        let adapter = GeocodingAdapter::new(Arc::clone(&registry));

        Self {
            autocomplete: Arc::new(AutocompleteService::new(Arc::new(adapter))),
            nonces: Arc::new(NonceManager::from_config(&current.security)),
            registry,
            config,
        }
    }

    /// Build the registry and cache from configuration and wire the services
    pub fn from_config(config: ReloadableConfig) -> Self {
        let current = config.load();
        let cache = GeocodingCache::new(&current.cache);
        let registry = Arc::new(ProviderRegistry::new(current.geocoding.clone(), cache));
        Self::new(config, registry)
    }

    /// Snapshot of the current configuration
    pub fn current_config(&self) -> Arc<AppConfig> {
        self.config.load()
    }
}

//! Provider registry
//!
//! Resolves provider ids to instances. Each id resolves to a single instance
//! that is reused for the registry's lifetime. Constructors run outside the
//! registry's locks, so a constructor may itself look up other providers.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use domain::GeocodingError;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    cache::GeocodingCache,
    config::GeocodingConfig,
    google_maps::{GOOGLE_MAPS_ID, GoogleMapsProvider},
    openstreetmap::{OPENSTREETMAP_ID, OpenStreetMapProvider},
    pipeline::ProviderHooks,
    provider::GeocodingProvider,
};

/// Builds a provider from the shared configuration, cache and hooks
pub type ProviderConstructor = Arc<
    dyn Fn(
            &GeocodingConfig,
            &GeocodingCache,
            &ProviderHooks,
        ) -> Result<Arc<dyn GeocodingProvider>, GeocodingError>
        + Send
        + Sync,
>;

/// Registry of available geocoding providers
pub struct ProviderRegistry {
    config: GeocodingConfig,
    active: RwLock<String>,
    cache: GeocodingCache,
    hooks: ProviderHooks,
    constructors: RwLock<BTreeMap<String, ProviderConstructor>>,
    instances: RwLock<HashMap<String, Arc<dyn GeocodingProvider>>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("active", &*self.active.read())
            .field("available", &self.available_provider_ids())
            .field("instances", &self.instances.read().len())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl ProviderRegistry {
    /// Create a registry with the built-in providers and no hooks
    #[must_use]
    pub fn new(config: GeocodingConfig, cache: GeocodingCache) -> Self {
        Self::with_hooks(config, cache, ProviderHooks::none())
    }

    /// Create a registry whose providers run the given hooks
    #[must_use]
    pub fn with_hooks(config: GeocodingConfig, cache: GeocodingCache, hooks: ProviderHooks) -> Self {
        let registry = Self {
            active: RwLock::new(config.provider.clone()),
            config,
            cache,
            hooks,
            constructors: RwLock::new(BTreeMap::new()),
            instances: RwLock::new(HashMap::new()),
        };

        registry.register(OPENSTREETMAP_ID, |config, cache, hooks| {
            let provider: Arc<dyn GeocodingProvider> = Arc::new(OpenStreetMapProvider::new(
                config,
                cache.clone(),
                hooks.clone(),
            )?);
            Ok(provider)
        });
        registry.register(GOOGLE_MAPS_ID, |config, cache, hooks| {
            let provider: Arc<dyn GeocodingProvider> =
                Arc::new(GoogleMapsProvider::new(config, cache.clone(), hooks.clone())?);
            Ok(provider)
        });

        registry
    }

    /// Register a provider constructor under an id
    ///
    /// Replaces any constructor already registered for the id. An instance
    /// created before the call stays in use.
    pub fn register<F>(&self, id: &str, constructor: F)
    where
        F: Fn(
                &GeocodingConfig,
                &GeocodingCache,
                &ProviderHooks,
            ) -> Result<Arc<dyn GeocodingProvider>, GeocodingError>
            + Send
            + Sync
            + 'static,
    {
        debug!(provider = %id, "Registering geocoding provider");
        self.constructors
            .write()
            .insert(id.to_string(), Arc::new(constructor));
    }

    /// Ids of all registered providers, sorted
    pub fn available_provider_ids(&self) -> Vec<String> {
        self.constructors.read().keys().cloned().collect()
    }

    /// Id of the currently active provider
    pub fn active_provider_id(&self) -> String {
        self.active.read().clone()
    }

    /// Switch the active provider
    ///
    /// Returns `false` and keeps the current provider if the id is unknown.
    pub fn set_active_provider(&self, id: &str) -> bool {
        if !self.constructors.read().contains_key(id) {
            warn!(provider = %id, "Ignoring unknown geocoding provider");
            return false;
        }

        let mut active = self.active.write();
        if *active != id {
            info!(from = %*active, to = %id, "Active geocoding provider changed");
            *active = id.to_string();
        }
        true
    }

    /// Get a provider by id, or the active one when `id` is `None`
    ///
    /// Returns `None` for unknown ids and for providers whose construction
    /// failed.
    pub fn get_provider(&self, id: Option<&str>) -> Option<Arc<dyn GeocodingProvider>> {
        let id = id.map_or_else(|| self.active_provider_id(), str::to_string);

        if let Some(provider) = self.instances.read().get(&id) {
            return Some(Arc::clone(provider));
        }

        let constructor = self.constructors.read().get(&id).cloned()?;

        let provider = match constructor(&self.config, &self.cache, &self.hooks) {
            Ok(provider) => provider,
            Err(e) => {
                warn!(provider = %id, error = %e, "Failed to create geocoding provider");
                return None;
            },
        };

        // A concurrent caller may have won the race; keep its instance
        let mut instances = self.instances.write();
        let kept = instances.entry(id.clone()).or_insert_with(|| {
            debug!(provider = %id, "Geocoding provider created");
            provider
        });
        Some(Arc::clone(kept))
    }

    /// Every registered provider that can be constructed, keyed by id
    pub fn get_all_providers(&self) -> BTreeMap<String, Arc<dyn GeocodingProvider>> {
        self.available_provider_ids()
            .into_iter()
            .filter_map(|id| self.get_provider(Some(&id)).map(|p| (id, p)))
            .collect()
    }

    /// The cache shared by all providers
    pub const fn cache(&self) -> &GeocodingCache {
        &self.cache
    }
}

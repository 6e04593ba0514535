//! Live configuration
//!
//! The server keeps its configuration behind an [`ArcSwap`] so handlers read
//! a consistent snapshot while SIGHUP swaps in a fresh one. Only the active
//! provider id and the cache settings take effect on a running registry;
//! provider instances keep the settings they were built with.

use std::sync::Arc;

use arc_swap::ArcSwap;
use infrastructure::AppConfig;
use integration_geocoding::ProviderRegistry;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Shared, swappable [`AppConfig`]
///
/// Every swap bumps a version counter that subscribers can await.
#[derive(Debug, Clone)]
pub struct ReloadableConfig {
    current: Arc<ArcSwap<AppConfig>>,
    version: Arc<watch::Sender<u64>>,
}

impl ReloadableConfig {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
            version: Arc::new(watch::Sender::new(0)),
        }
    }

    /// Snapshot of the configuration in effect
    #[must_use]
    pub fn load(&self) -> Arc<AppConfig> {
        self.current.load_full()
    }

    /// Install `config`, returning the one it replaced
    pub fn replace(&self, config: AppConfig) -> Arc<AppConfig> {
        let previous = self.current.swap(Arc::new(config));
        self.version.send_modify(|v| *v += 1);
        previous
    }

    /// Re-read the configuration sources and install the result
    ///
    /// On failure the current configuration stays in place and `false` is
    /// returned.
    pub fn reload(&self) -> bool {
        let fresh = match AppConfig::load() {
            Ok(fresh) => fresh,
            Err(e) => {
                error!(error = %e, "Configuration reload rejected");
                return false;
            },
        };

        let previous = self.replace(fresh);
        info!(
            from = %previous.geocoding.provider,
            to = %self.load().geocoding.provider,
            "Geocoding configuration reloaded"
        );
        true
    }

    /// Version counter, bumped on every swap
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

/// Push the runtime-adjustable settings into the live registry and cache
pub fn apply_runtime_settings(config: &AppConfig, registry: &ProviderRegistry) {
    if !registry.set_active_provider(&config.geocoding.provider) {
        warn!(
            provider = %config.geocoding.provider,
            active = %registry.active_provider_id(),
            "Configured provider is unknown, keeping the active one"
        );
    }
    registry.cache().apply(&config.cache);
}

/// Reload the configuration on every SIGHUP and apply it to `registry`
#[cfg(unix)]
pub fn spawn_config_reload_handler(
    config: ReloadableConfig,
    registry: Arc<ProviderRegistry>,
) -> ReloadableConfig {
    use tokio::signal::unix::{SignalKind, signal};

    let live = config.clone();
    tokio::spawn(async move {
        let mut hangups = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGHUP, configuration reload disabled");
                return;
            },
        };

        while hangups.recv().await.is_some() {
            info!("📥 SIGHUP received, reloading configuration");
            if live.reload() {
                apply_runtime_settings(&live.load(), &registry);
                info!(
                    provider = %registry.active_provider_id(),
                    cache_enabled = registry.cache().is_enabled(),
                    "✅ Runtime settings applied"
                );
            }
        }
    });

    config
}

#[cfg(not(unix))]
pub fn spawn_config_reload_handler(
    config: ReloadableConfig,
    _registry: Arc<ProviderRegistry>,
) -> ReloadableConfig {
    warn!("Configuration reload on SIGHUP is unavailable on this platform");
    config
}

#[cfg(test)]
mod tests {
    use integration_geocoding::GeocodingCache;

    use super::*;

    fn registry(config: &AppConfig) -> ProviderRegistry {
        ProviderRegistry::new(config.geocoding.clone(), GeocodingCache::new(&config.cache))
    }

    #[test]
    fn load_returns_installed_snapshot() {
        let mut installed = AppConfig::default();
        installed.server.port = 8088;
        let live = ReloadableConfig::new(installed);

        assert_eq!(live.load().server.port, 8088);
    }

    #[test]
    fn replace_swaps_and_returns_old() {
        let reloadable = ReloadableConfig::new(AppConfig::default());
        let mut next = AppConfig::default();
        next.geocoding.provider = "google-maps".to_string();

        let old = reloadable.replace(next);
        assert_eq!(old.geocoding.provider, "openstreetmap");
        assert_eq!(reloadable.load().geocoding.provider, "google-maps");
    }

    #[tokio::test]
    async fn replace_notifies_subscribers() {
        let live = ReloadableConfig::new(AppConfig::default());
        let mut version = live.subscribe();
        assert_eq!(*version.borrow(), 0);

        live.replace(AppConfig::default());

        version.changed().await.unwrap();
        assert_eq!(*version.borrow_and_update(), 1);
    }

    #[test]
    fn runtime_settings_switch_provider_and_cache() {
        let config = AppConfig::default();
        let registry = registry(&config);

        let mut next = AppConfig::default();
        next.geocoding.provider = "google-maps".to_string();
        next.cache.enabled = false;
        next.cache.duration_secs = 60;
        apply_runtime_settings(&next, &registry);

        assert_eq!(registry.active_provider_id(), "google-maps");
        assert!(!registry.cache().is_enabled());
        assert_eq!(registry.cache().default_ttl().as_secs(), 60);
    }

    #[test]
    fn unknown_provider_keeps_active() {
        let config = AppConfig::default();
        let registry = registry(&config);

        let mut next = AppConfig::default();
        next.geocoding.provider = "here".to_string();
        apply_runtime_settings(&next, &registry);

        assert_eq!(registry.active_provider_id(), "openstreetmap");
    }
}

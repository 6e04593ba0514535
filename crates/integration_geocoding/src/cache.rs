//! Shared response cache for geocoding providers
//!
//! Values are stored JSON-encoded so one cache instance can hold search
//! result lists and place details alike. Every key is stored under a
//! reserved prefix so [`GeocodingCache::clear_all`] removes exactly the
//! entries this crate created.
//!
//! The cache never fails its callers: a disabled cache, an expired entry and
//! an entry that no longer decodes are all reported as a miss.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use moka::{Expiry, future::Cache};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::config::CacheConfig;

/// Reserved prefix for every stored key
const KEY_PREFIX: &str = "geoac_";

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Vec<u8>,
    /// `None` means the entry never expires
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Per-entry expiry driven by the entry's own deadline
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        value
            .expires_at
            .map(|at| at.saturating_duration_since(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value
            .expires_at
            .map(|at| at.saturating_duration_since(updated_at))
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that fell through to the upstream
    pub misses: u64,
    /// Entries currently stored (approximate)
    pub entries: u64,
    /// Whether caching is enabled
    pub enabled: bool,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    store: Cache<String, CacheEntry>,
    enabled: AtomicBool,
    default_ttl_secs: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Key-value cache with per-entry TTL
///
/// Cheap to clone; clones share the same store, settings and counters.
#[derive(Clone)]
pub struct GeocodingCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for GeocodingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingCache")
            .field("entries", &self.inner.store.entry_count())
            .field("enabled", &self.is_enabled())
            .field("hits", &self.inner.hits.load(Ordering::Relaxed))
            .field("misses", &self.inner.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl GeocodingCache {
    /// Create a cache from its settings
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let store = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(EntryExpiry)
            .build();

        Self {
            inner: Arc::new(Inner {
                store,
                enabled: AtomicBool::new(config.enabled),
                default_ttl_secs: AtomicU64::new(config.duration_secs),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Derive a cache key for an operation and its inputs
    ///
    /// The operation (for example `osm_search`) stays readable in the key and
    /// namespaces it; the inputs are hashed with BLAKE3. Identical inputs
    /// always produce the same key. Each part is length-prefixed, so moving
    /// text across part boundaries changes the key.
    #[must_use]
    pub fn key(operation: &str, parts: &[&str]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(operation.as_bytes());
        for part in parts {
            hasher.update(&part.len().to_le_bytes());
            hasher.update(part.as_bytes());
        }
        format!("{operation}_{}", hasher.finalize().to_hex())
    }

    fn storage_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    /// Look up a value
    ///
    /// Returns `None` when caching is disabled, the key is absent or expired,
    /// or the stored value does not decode as `T`.
    #[instrument(skip(self), level = "debug")]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }

        let storage_key = Self::storage_key(key);
        let Some(entry) = self.inner.store.get(&storage_key).await else {
            self.record_miss(key);
            return None;
        };

        if entry.is_expired() {
            self.inner.store.invalidate(&storage_key).await;
            self.record_miss(key);
            return None;
        }

        match serde_json::from_slice(&entry.payload) {
            Ok(value) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                Some(value)
            },
            Err(e) => {
                warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                self.inner.store.invalidate(&storage_key).await;
                self.record_miss(key);
                None
            },
        }
    }

    /// Store a value, replacing any existing entry for the key
    ///
    /// `ttl` defaults to the configured duration; a zero duration stores
    /// the entry without expiry. Returns `false` when caching is disabled or
    /// the value cannot be encoded.
    #[instrument(skip(self, value), level = "debug")]
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let payload = match serde_json::to_vec(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %key, error = %e, "Value not cacheable");
                return false;
            },
        };

        let ttl = ttl.unwrap_or_else(|| self.default_ttl());
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };

        self.inner
            .store
            .insert(Self::storage_key(key), CacheEntry { payload, expires_at })
            .await;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        true
    }

    /// Remove one entry, returning whether it existed
    #[instrument(skip(self), level = "debug")]
    pub async fn delete(&self, key: &str) -> bool {
        self.inner
            .store
            .remove(&Self::storage_key(key))
            .await
            .is_some()
    }

    /// Remove every entry created through this cache
    ///
    /// Returns the number of entries removed.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> u64 {
        self.inner.store.run_pending_tasks().await;

        let keys: Vec<String> = self
            .inner
            .store
            .iter()
            .filter(|(k, _)| k.starts_with(KEY_PREFIX))
            .map(|(k, _)| (*k).clone())
            .collect();

        let mut count = 0u64;
        for key in keys {
            if self.inner.store.remove(&key).await.is_some() {
                count += 1;
            }
        }

        info!(count, "Cleared geocoding cache");
        count
    }

    /// Whether caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable caching; stored entries are kept
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Default lifetime for new entries
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.inner.default_ttl_secs.load(Ordering::Relaxed))
    }

    /// Change the default lifetime for new entries
    pub fn set_default_ttl(&self, ttl: Duration) {
        self.inner
            .default_ttl_secs
            .store(ttl.as_secs(), Ordering::Relaxed);
    }

    /// Apply reloaded settings; capacity is fixed at construction
    pub fn apply(&self, config: &CacheConfig) {
        self.set_enabled(config.enabled);
        self.set_default_ttl(config.duration());
        debug!(
            enabled = config.enabled,
            duration_secs = config.duration_secs,
            "Cache settings applied"
        );
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            entries: self.inner.store.entry_count(),
            enabled: self.is_enabled(),
        }
    }

    fn record_miss(&self, key: &str) {
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache miss");
    }
}

impl Default for GeocodingCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

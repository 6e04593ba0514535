//! Anti-forgery tokens
//!
//! A nonce is a keyed BLAKE3 MAC over (tick, action, session). A tick lasts
//! half the configured lifetime; a nonce verifies during the tick it was
//! issued in and the one after, so it lives between half and the full
//! lifetime.

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use infrastructure::SecurityConfig;
use subtle::ConstantTimeEq;
use tracing::warn;
use uuid::Uuid;

/// Action guarded by the public search and details endpoints
pub const AUTOCOMPLETE_ACTION: &str = "autocomplete";

/// Hex characters in a nonce
const NONCE_LEN: usize = 20;

const KEY_CONTEXT: &str = "address-autocomplete 2026-01 nonce signing key";

/// Issues and verifies nonces
pub struct NonceManager {
    key: [u8; 32],
    lifetime_secs: u64,
}

impl fmt::Debug for NonceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl NonceManager {
    /// Create a manager keyed from `secret`
    ///
    /// Without a secret the key is random and nonces are invalidated by a
    /// restart.
    pub fn new(secret: Option<&str>, lifetime_secs: u64) -> Self {
        let key = match secret.filter(|s| !s.trim().is_empty()) {
            Some(secret) => blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
            None => {
                let mut seed = [0_u8; 32];
                seed[..16].copy_from_slice(Uuid::new_v4().as_bytes());
                seed[16..].copy_from_slice(Uuid::new_v4().as_bytes());
                blake3::derive_key(KEY_CONTEXT, &seed)
            },
        };

        Self {
            key,
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    /// Create a manager from the security configuration
    pub fn from_config(config: &SecurityConfig) -> Self {
        let secret = config.nonce_secret();
        if secret.is_none() {
            warn!("No nonce secret configured, nonces will not survive a restart");
        }
        Self::new(secret, config.nonce_lifetime_secs)
    }

    /// Issue a nonce for `action` bound to `session`
    pub fn create(&self, action: &str, session: &str) -> String {
        self.create_at(action, session, unix_now())
    }

    /// Issue a nonce as of `now` (seconds since the epoch)
    pub fn create_at(&self, action: &str, session: &str, now: u64) -> String {
        self.sign(self.tick(now), action, session)
    }

    /// Check a nonce for `action` and `session`
    pub fn verify(&self, nonce: &str, action: &str, session: &str) -> bool {
        self.verify_at(nonce, action, session, unix_now())
    }

    /// Check a nonce as of `now` (seconds since the epoch)
    pub fn verify_at(&self, nonce: &str, action: &str, session: &str, now: u64) -> bool {
        if nonce.len() != NONCE_LEN {
            return false;
        }

        let tick = self.tick(now);
        [tick, tick.saturating_sub(1)].into_iter().any(|t| {
            self.sign(t, action, session)
                .as_bytes()
                .ct_eq(nonce.as_bytes())
                .into()
        })
    }

    fn tick(&self, now: u64) -> u64 {
        now.div_ceil(self.lifetime_secs / 2)
    }

    fn sign(&self, tick: u64, action: &str, session: &str) -> String {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(&tick.to_le_bytes());
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(session.as_bytes());

        let hex = hasher.finalize().to_hex();
        hex.as_str()[..NONCE_LEN].to_string()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;
    const NOW: u64 = 1_790_000_000;

    fn manager() -> NonceManager {
        NonceManager::new(Some("test-secret"), DAY)
    }

    #[test]
    fn fresh_nonce_verifies() {
        let nonces = manager();
        let nonce = nonces.create_at(AUTOCOMPLETE_ACTION, "session-1", NOW);
        assert_eq!(nonce.len(), NONCE_LEN);
        assert!(nonces.verify_at(&nonce, AUTOCOMPLETE_ACTION, "session-1", NOW));
    }

    #[test]
    fn nonce_is_bound_to_action_and_session() {
        let nonces = manager();
        let nonce = nonces.create_at(AUTOCOMPLETE_ACTION, "session-1", NOW);
        assert!(!nonces.verify_at(&nonce, "admin", "session-1", NOW));
        assert!(!nonces.verify_at(&nonce, AUTOCOMPLETE_ACTION, "session-2", NOW));
    }

    #[test]
    fn nonce_survives_one_tick() {
        let nonces = manager();
        let nonce = nonces.create_at(AUTOCOMPLETE_ACTION, "s", NOW);
        assert!(nonces.verify_at(&nonce, AUTOCOMPLETE_ACTION, "s", NOW + DAY / 2));
    }

    #[test]
    fn nonce_expires_after_two_ticks() {
        let nonces = manager();
        let nonce = nonces.create_at(AUTOCOMPLETE_ACTION, "s", NOW);
        assert!(!nonces.verify_at(&nonce, AUTOCOMPLETE_ACTION, "s", NOW + DAY + 1));
    }

    #[test]
    fn same_secret_shares_nonces() {
        let nonce = manager().create_at(AUTOCOMPLETE_ACTION, "s", NOW);
        assert!(manager().verify_at(&nonce, AUTOCOMPLETE_ACTION, "s", NOW));

        let other = NonceManager::new(Some("other-secret"), DAY);
        assert!(!other.verify_at(&nonce, AUTOCOMPLETE_ACTION, "s", NOW));
    }

    #[test]
    fn random_keys_differ() {
        let a = NonceManager::new(None, DAY);
        let b = NonceManager::new(Some("   "), DAY);
        let nonce = a.create_at(AUTOCOMPLETE_ACTION, "s", NOW);
        assert!(!b.verify_at(&nonce, AUTOCOMPLETE_ACTION, "s", NOW));
    }

    #[test]
    fn malformed_nonces_are_rejected() {
        let nonces = manager();
        assert!(!nonces.verify_at("", AUTOCOMPLETE_ACTION, "s", NOW));
        assert!(!nonces.verify_at("zz", AUTOCOMPLETE_ACTION, "s", NOW));
        let long = nonces.create_at(AUTOCOMPLETE_ACTION, "s", NOW) + "0";
        assert!(!nonces.verify_at(&long, AUTOCOMPLETE_ACTION, "s", NOW));
    }

    #[test]
    fn tiny_lifetime_is_clamped() {
        let nonces = NonceManager::new(Some("k"), 0);
        let nonce = nonces.create(AUTOCOMPLETE_ACTION, "s");
        assert!(nonces.verify(&nonce, AUTOCOMPLETE_ACTION, "s"));
    }
}

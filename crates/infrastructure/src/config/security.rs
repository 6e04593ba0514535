//! Security configuration: anti-forgery tokens and admin access.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Key for signing anti-forgery tokens (nonces)
    ///
    /// When unset a random key is generated at startup, so issued tokens
    /// do not survive a restart.
    #[serde(default, skip_serializing)]
    pub nonce_secret: Option<SecretString>,

    /// Nonce lifetime in seconds (default: 24 hours)
    #[serde(default = "default_nonce_lifetime")]
    pub nonce_lifetime_secs: u64,

    /// Bearer token for the admin endpoints; admin endpoints are disabled
    /// when unset
    #[serde(default, skip_serializing)]
    pub admin_token: Option<SecretString>,
}

const fn default_nonce_lifetime() -> u64 {
    24 * 60 * 60
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            nonce_secret: None,
            nonce_lifetime_secs: default_nonce_lifetime(),
            admin_token: None,
        }
    }
}

impl SecurityConfig {
    /// The admin token, if one is configured and non-blank
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|token| !token.trim().is_empty())
    }

    /// The nonce signing secret, if one is configured and non-blank
    pub fn nonce_secret(&self) -> Option<&str> {
        self.nonce_secret
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|secret| !secret.trim().is_empty())
    }

    /// Check if the admin endpoints are enabled
    pub fn admin_enabled(&self) -> bool {
        self.admin_token().is_some()
    }
}

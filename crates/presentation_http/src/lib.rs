//! Address autocomplete HTTP presentation layer
//!
//! Serves the AJAX endpoints consumed by the autocomplete widget, the
//! session bootstrap that hands out anti-forgery tokens, and the admin
//! actions.

pub mod config_reload;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod nonce;
pub mod routes;
pub mod state;

pub use config_reload::{ReloadableConfig, spawn_config_reload_handler};
pub use error::{ApiError, Envelope, ErrorData};
pub use middleware::AdminAuthLayer;
pub use nonce::{AUTOCOMPLETE_ACTION, NonceManager};
pub use routes::create_router;
pub use state::AppState;

//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, middleware::AdminAuthLayer, state::AppState};

/// Create the main router with all routes
///
/// The admin token is read once here; changing it requires a restart.
pub fn create_router(state: AppState) -> Router {
    let admin_layer = AdminAuthLayer::new(state.current_config().security.admin_token());

    let admin = Router::new()
        .route(
            "/admin/test-connection",
            post(handlers::admin::test_connection),
        )
        .route("/admin/clear-cache", post(handlers::admin::clear_cache))
        .route("/admin/status", get(handlers::admin::status))
        .layer(admin_layer);

    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Widget AJAX
        .route("/ajax/session", get(handlers::session::session))
        .route("/ajax/search", post(handlers::ajax::search))
        .route("/ajax/place-details", post(handlers::ajax::place_details))
        // Admin actions
        .merge(admin)
        // Attach state
        .with_state(state)
}

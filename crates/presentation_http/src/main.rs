//! Address autocomplete HTTP server
//!
//! Main entry point for the autocomplete API server.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use axum::http::{HeaderValue, Method};
use infrastructure::{AppConfig, LogFormat, ServerConfig, init_tracing};
use presentation_http::{ReloadableConfig, routes, spawn_config_reload_handler, state::AppState};
use tokio::{net::TcpListener, signal, sync::Notify};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the format can be honoured
    let config_result = AppConfig::load();
    let log_format = config_result
        .as_ref()
        .map_or(LogFormat::Text, |c| LogFormat::from_config(&c.server.log_format));
    init_tracing(log_format);

    info!("📍 Address autocomplete v{} starting...", env!("CARGO_PKG_VERSION"));

    let initial_config = config_result.unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    info!(
        host = %initial_config.server.host,
        port = %initial_config.server.port,
        provider = %initial_config.geocoding.provider,
        cache_enabled = initial_config.cache.enabled,
        "Configuration loaded"
    );

    let state = AppState::from_config(ReloadableConfig::new(initial_config.clone()));

    if state.registry.get_provider(None).is_none() {
        warn!(
            provider = %initial_config.geocoding.provider,
            available = ?state.registry.available_provider_ids(),
            "Configured geocoding provider is not available"
        );
    }
    if !initial_config.security.admin_enabled() {
        info!("No admin token configured, admin endpoints are disabled");
    }

    spawn_config_reload_handler(state.config.clone(), Arc::clone(&state.registry));

    let app = routes::create_router(state)
        .layer(RequestBodyLimitLayer::new(
            initial_config.server.max_body_size_bytes,
        ))
        .layer(cors_layer(&initial_config.server))
        .layer(TraceLayer::new_for_http());

    let addr = initial_config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("🚀 Autocomplete API listening on http://{}", addr);

    let grace = Duration::from_secs(initial_config.server.shutdown_timeout_secs);
    let stopping = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&stopping)))
        .into_future();

    tokio::select! {
        result = server => result?,
        () = async {
            stopping.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_secs = grace.as_secs(), "Open connections did not drain in time, exiting");
        }
    }

    info!("👋 Autocomplete API stopped");
    Ok(())
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Resolve on SIGINT or SIGTERM and start the drain deadline
async fn shutdown_signal(stopping: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let source = tokio::select! {
        () = ctrl_c => "Ctrl+C",
        () = terminate => "SIGTERM",
    };
    info!(signal = source, "📥 Shutting down, draining open connections");
    stopping.notify_one();
}

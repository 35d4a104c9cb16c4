// HTTP front-end
//
// Exposes the fallback router under /ai-assistant for the notebook UI

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::llm::models::provider_handle::ProviderFactory;
use crate::llm::router::FallbackRouter;

/// Shared, read-only request state
pub struct AppState {
    pub router: FallbackRouter<ProviderFactory>,
    pub live_config: bool,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let default_provider = config.default_provider();
        let live_config = config.server.live_config;
        let factory = ProviderFactory::new(config)?;
        Ok(Self {
            router: FallbackRouter::new(factory, default_provider),
            live_config,
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/ai-assistant/config", get(handlers::get_llm_config))
        .route("/ai-assistant/llm", post(handlers::llm_request))
        .route("/ai-assistant/fix-error", post(handlers::fix_error))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the API server and run until Ctrl-C
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(Arc::new(config))?);
    state.router.resolver().warm_up().await;
    log::info!(
        "Default provider: {}, live config: {}",
        state.router.default_provider(),
        state.live_config
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("AI assistant API ready at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

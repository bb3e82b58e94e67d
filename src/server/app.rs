use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::api::{self, AppState};
use super::assets::static_handler;
use crate::config::CapacityConfig;
use crate::errors::ServerError;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub environment: String,
    pub debug: String,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("backend/static"),
            environment: "development".to_string(),
            debug: "False".to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &CapacityConfig) -> Self {
        Self {
            host: config.toml.server.host.clone(),
            port: config.port(),
            static_dir: config.static_dir(),
            environment: config.environment().to_string(),
            debug: config.debug().to_string(),
            cors_origins: config.toml.server.cors_origins.clone(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the full application router with API routes and SPA serving.
pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router()
        .fallback(get(static_handler))
        .with_state(state)
}

/// CORS for the local Vite dev server.
///
/// Credentials are allowed, so methods and headers mirror the request
/// instead of using a wildcard.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Build the router with its middleware stack.
pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let state = Arc::new(AppState {
        environment: config.environment.clone(),
        debug: config.debug.clone(),
        static_dir: config.static_dir.clone(),
    });

    Ok(build_router(state)
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http()))
}

/// Start the API server and block until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    if !config.static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} not found; only /api routes will respond. Run `capacity build` first.",
            config.static_dir.display()
        );
    }

    let app = build_app(&config)?;

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::BindFailed {
            addr: addr.clone(),
            source,
        })?;

    let local_addr = listener.local_addr()?;
    tracing::info!(environment = %config.environment, "Capacity API listening on http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

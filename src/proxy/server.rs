//! HTTP server setup and configuration.

use axum::routing::{any, get};
use axum::Router;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::Config;
use crate::router::Catalog;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub http_client: Client,
    pub config: Arc<Config>,
}

/// Create the axum router with all endpoints.
///
/// Every response passes through the CORS layer, which is what puts
/// `Access-Control-Allow-Origin: *` on the wire.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any);

    Router::new()
        .route("/", any(handlers::root))
        .route("/models", any(handlers::list_models))
        .route(
            "/generate",
            get(handlers::generate).fallback(handlers::method_not_allowed),
        )
        .route(
            "/image",
            get(handlers::image).fallback(handlers::method_not_allowed),
        )
        .route(
            "/permanent",
            get(handlers::permanent).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    let catalog = Catalog::new(&config.upstream)?;

    // Client timeout doubles as the upstream call budget; connect gets a
    // shorter one so dead hosts fail fast.
    let http_client = Client::builder()
        .timeout(Duration::from_secs(config.upstream.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let state = AppState {
        catalog: Arc::new(catalog),
        http_client,
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting imgrelay server");

    axum::serve(listener, app).await?;

    Ok(())
}

pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;
pub mod translate;

use std::sync::Arc;

use axum::{http::HeaderValue, serve, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{create_router, AppContext, AppState};
use crate::config::AppConfig;
use crate::translate::Translator;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Router with state and middleware applied, ready to serve
pub fn build_app<S: Store + 'static>(ctx: AppState<S>) -> Router {
    let cors = cors_layer(&ctx.config.server.cors_origins);
    create_router::<S>()
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(ctx)
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Serve the API on the configured address until a shutdown signal arrives
pub async fn run_server<S: Store + 'static>(
    store: Arc<S>,
    translator: Arc<dyn Translator>,
    config: AppConfig,
) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let ctx = Arc::new(AppContext::new(store, translator, config));
    let app = build_app(ctx);

    let listener = TcpListener::bind(&bind_address).await?;
    println!("Agri BFF server running on http://{}", bind_address);

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("Server shut down");
    Ok(())
}

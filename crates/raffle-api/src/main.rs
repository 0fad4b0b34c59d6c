//! Secret friend raffle API server entry point.

use std::sync::Arc;

use axum::Router;
use raffle_api::config::AppConfig;
use raffle_api::error::AppError;
use raffle_api::feedback::BroadcastFeedbackSink;
use raffle_api::routes;
use raffle_api::state::AppState;
use raffle_core::clock::SystemClock;
use raffle_core::rng::OsSeededRng;
use raffle_core::store::KeyValueStore;
use raffle_session::application::engine::{self, EngineDeps};
use raffle_store::memory_store::MemoryKeyValueStore;
use raffle_store::sqlite_store::SqliteKeyValueStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

async fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match SqliteKeyValueStore::connect(&config.database_url, config.store_prefix.clone()).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::error!(
                error = %err,
                "could not open database; session will not survive a restart"
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting secret friend raffle API server");

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;

    let store = open_store(&config).await;
    let feedback = BroadcastFeedbackSink::default();
    let session = engine::start(EngineDeps {
        store,
        rng: Box::new(OsSeededRng::new()),
        clock: Arc::new(SystemClock),
        feedback: Arc::new(feedback.clone()),
        timing: config.timing,
    })
    .await;

    let app_state = AppState::new(session.clone(), feedback);

    // TODO: Replace CorsLayer::permissive() with the presentation layer's origin once it is deployed.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/raffle", routes::raffle::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.shutdown().await;
    Ok(())
}

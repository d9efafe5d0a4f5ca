mod config;
mod db;
mod errors;
mod insights;
mod models;
mod routes;
mod sentiment;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::sentiment::gemini::GeminiClient;
use crate::sentiment::SentimentClassifier;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("insights_api={}", &config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting insights API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (creates the insights table if missing)
    let db = create_pool(&config.database_url).await?;

    // Initialize the sentiment classifier. A missing GEMINI_API_KEY is fine
    // here: classification calls report it as unconfigured at request time.
    let provider = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let classifier = Arc::new(SentimentClassifier::new(provider));
    info!(
        "Sentiment classifier initialized (model: {}, configured: {})",
        config.gemini_model,
        config.gemini_api_key.is_some()
    );

    // Build app state
    let state = AppState {
        db,
        classifier,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod analytics;
mod config;
mod errors;
mod feedback;
mod models;
mod routes;
mod sessions;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::sessions::sweep_idle_sessions;
use crate::state::AppState;
use crate::store::open_store;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting feedback API v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(config.store_path.as_deref())?;
    info!(
        "Collector config: requires_comment={}, submit latency {}ms",
        config.requires_comment, config.submit_latency_ms
    );

    let state = AppState::new(store, config.clone());
    tokio::spawn(sweep_idle_sessions(
        state.sessions.clone(),
        config.session_idle(),
    ));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // docs pages are served from another origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

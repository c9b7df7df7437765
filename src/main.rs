use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trailroom::{
    broadcast::BroadcastRoom, config::ServerConfig, state::SessionRegistry, ws, ws::Gateway,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trailroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().inspect_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
    })?;
    tracing::info!("Starting trailroom with {:?}", config);

    let registry = SessionRegistry::new(config.registry.clone());
    let room = BroadcastRoom::new();
    let state = Arc::new(Gateway::new(registry, room, config.always_emit_dead));

    let app = ws::router(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use theatre_api::{app, config::Config, AppState};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // the subscriber isn't up yet
            eprintln!("Invalid configuration: {e}");
            return Err(e.into());
        }
    };

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));
    if config.app.environment == "production" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!(
        "Starting Theatre API ({} environment)",
        config.app.environment
    );

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port).parse()?;

    let state = AppState::new(config).await.inspect_err(|e| {
        error!("Startup failed: {:?}", e);
    })?;

    let app = app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

use habit_tracker::{identity::StaticTokens, router, AppState, Config, JsonFileStore};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let store = JsonFileStore::open(config.data_path.clone()).await?;
    let identity = StaticTokens::new(config.tokens);
    if identity.is_empty() {
        warn!("no identities configured, every request will be unauthorized");
    }
    info!(
        data_path = %config.data_path.display(),
        identities = identity.len(),
        "store loaded"
    );

    let state = AppState::new(Arc::new(store), Arc::new(identity));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

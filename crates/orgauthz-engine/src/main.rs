//! orgauthz engine binary.
//!
//! Loads `orgauthz.yaml` (or the path given as first argument), builds the
//! authorizer over a file-backed policy store, and serves the JSON API.

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use orgauthz_engine::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "orgauthz.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.server.listen.parse()?;

    let state = app_state::AppState::new(cfg).await?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "orgauthz-engine starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    state.authorizer().shutdown().await;
    tracing::info!("orgauthz-engine stopped");
    Ok(())
}

//! Updeight server entry point.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use updeight_auth::spawn_daily_sweep;
use updeight_db::DbManager;
use updeight_server::{AppState, ServerConfig, SessionCookie, router};

#[derive(Debug, Parser)]
#[command(name = "updeight", version, about = "Multi-tenant time tracking backend")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "UPDEIGHT_CONFIG", default_value = "updeight.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("updeight=info".parse()?))
        .json()
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;
    info!(config = %cli.config.display(), bind_addr = %config.bind_addr, "Starting Updeight server");

    let key = config.cookie.key()?;
    let db = DbManager::connect(&config.db).await?;

    let state = AppState::new(
        db.into_client(),
        &config.auth,
        SessionCookie::new(&config.cookie, key),
    );

    let restored = state.sessions.restore_timers().await?;
    info!(restored, "Session expiry timers restored");
    let sweep = spawn_daily_sweep(state.sessions.clone(), config.auth.sweep_hour);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.abort();
    state.sessions.scheduler().cancel_all();
    info!("Updeight server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

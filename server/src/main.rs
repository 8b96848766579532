use anyhow::{Context, Result};
use clap::Parser;
use rushget_server::{cli::Cli, logging, RelayState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    if let Err(err) = start().await {
        eprintln!("rushget error: {err:#}");
        std::process::exit(1);
    }
}

async fn start() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    if let Err(err) = logging::init(config.log_file.as_deref()) {
        logging::init_stderr();
        tracing::warn!("file logging unavailable, using stderr: {err:#}");
    }

    let state = RelayState::from_config(&config)?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(
        addr = %config.bind,
        route = %config.route,
        rules = state.allowlist.rules().len(),
        "relay listening"
    );

    rushget_server::run_until(listener, state, &config.route, shutdown_signal()).await?;
    tracing::info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!("failed to listen for SIGTERM: {err}");
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
    tracing::info!("shutdown signal received");
}

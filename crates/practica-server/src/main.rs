//! practica-server - REST API server binary.

use std::net::SocketAddr;

use practica_core::PracticaConfig;
use practica_server::{create_server, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("practica_server=debug".parse()?),
        )
        .init();

    let config = match std::env::var("PRACTICA_CONFIG") {
        Ok(path) => {
            info!(%path, "Loading configuration file");
            PracticaConfig::from_file(path)?
        }
        Err(_) => PracticaConfig::from_env(),
    };

    let host = std::env::var("PRACTICA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PRACTICA_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    let state = AppState::from_config(config)?;
    info!(item_bank = %state.bank_name().await, "Item bank ready");

    let app = create_server(state.clone());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting practica-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, closing sessions...");
        })
        .await?;

    state.shutdown().await;

    info!("Server stopped cleanly");
    Ok(())
}

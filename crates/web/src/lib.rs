//! HTTP front end for the research service
//!
//! `POST /api/research` runs one query. `GET /health` reports liveness and
//! `GET /health/ready` runs the full health check.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

pub use routes::build_router;
pub use state::AppState;

/// Serve until Ctrl+C or SIGTERM
pub async fn serve(listen_addr: &str, state: AppState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", listen_addr))?;
    info!(address = %listen_addr, "researchdesk listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            error!(error = %err, "server shutdown with error");
            err
        })?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            stream.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

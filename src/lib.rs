use anyhow::Context;
use axum::serve;
use config::Config;
use routes::init_router;
use state::AppState;
use tokio::net::TcpListener;

pub mod auth;
pub mod chatbot;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod extract;
pub mod media;
pub mod middlewares;
pub mod model;
pub mod routes;
pub mod state;
pub mod telemetry;

pub async fn run() -> Result<(), anyhow::Error> {
    let config = Config::new().context("Failed to read configuration.")?;
    let address = config.application.get_address();
    let state = AppState::init(config).await?;
    let pool = state.pool.clone();
    let router = init_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}.", address))?;
    tracing::info!(%address, "Starting server");

    serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

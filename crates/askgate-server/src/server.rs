//! Listener setup and graceful shutdown.

use crate::routes::create_router;
use crate::state::AppState;
use askgate_core::ServerConfig;

/// Serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let app = create_router(state, config.ui_enabled);
    let address = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, ui = config.ui_enabled, "askgate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("askgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

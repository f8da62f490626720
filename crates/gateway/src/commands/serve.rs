//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use common::{AppError, AppResult};
use user_service_lib::{AccountStore, Database};

use crate::cli::ServeArgs;
use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: GatewayConfig) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Connect and apply pending migrations
    let db = Database::connect(&config.database)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    tracing::info!("Database connected");

    let repo = Arc::new(AccountStore::new(db.get_connection()));
    let app = create_router(AppState::from_repository(repo, &config.jwt));

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Received shutdown signal, draining connections...");
}

// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entry point for the PII Shield API server

use anyhow::{Context, Result};
use pii_shield::scanner::PiiScanner;
use pii_shield::service::{build_router, AppState, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pii_shield=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PII Shield API server");

    let settings = Settings::from_env().context("Failed to load configuration")?;
    tracing::info!(
        sensitivity = %settings.scanner.sensitivity,
        fallback = settings.scanner.fallback_enabled,
        max_input_chars = settings.max_input_chars,
        "Configuration loaded"
    );

    let scanner =
        PiiScanner::new(settings.scanner.clone()).context("Failed to compile PII patterns")?;
    let state = AppState::new(scanner, &settings).context("Failed to build HTTP client")?;
    let app = build_router(state);

    let addr = settings.bind_addr();
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

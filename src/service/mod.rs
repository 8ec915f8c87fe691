// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// JSON HTTP service around the scanner

pub mod error;
pub mod responder;
pub mod routes;
pub mod settings;
pub mod state;
pub mod vault;
pub mod webpage;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use responder::MockResponder;
pub use settings::Settings;
pub use state::AppState;
pub use vault::{PiiRecord, PiiVault, UserKey, VaultConfig};
pub use webpage::{WebpageConfig, WebpageError, WebpageFetcher};

/// Build the Axum application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health_handler))
        .route("/health", get(routes::health_handler))
        .route("/api/process-message", post(routes::process_message_handler))
        .route("/api/pii/:user/:session", get(routes::get_pii_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

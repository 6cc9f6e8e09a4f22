//! HTTP API over the live index
//!
//! Thin layer: handlers read the [`LiveIndex`] and trigger the
//! [`RefreshOrchestrator`]; no ingestion logic lives here.

pub mod handlers;

use crate::{config::AllowedOrigins, index::LiveIndex, refresh::RefreshOrchestrator};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub live: Arc<LiveIndex>,
    pub orchestrator: Arc<RefreshOrchestrator>,
    /// `None` leaves `/admin/refresh` open
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(orchestrator: Arc<RefreshOrchestrator>, admin_token: Option<String>) -> Self {
        Self {
            live: Arc::clone(orchestrator.live()),
            orchestrator,
            admin_token,
        }
    }
}

/// Build the router with all routes and CORS
pub fn build_router(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/check", get(handlers::check))
        .route("/admin/refresh", post(handlers::admin_refresh))
        .layer(cors_layer(origins))
        .with_state(state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin '{}'", origin);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

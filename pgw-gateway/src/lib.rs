//! pgw-gateway library - photo asset gateway
//!
//! Authenticates bearer tokens against the asset store (with a shared token
//! cache in front), serves asset pages enriched with grouping and
//! near-duplicate classification, and reports composite dependency health.

use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod cache;
pub mod clients;
pub mod error;
pub mod services;

#[cfg(test)]
mod test_support;

use clients::AssetSource;
use services::{AuthGate, EnrichmentEngine, HealthAggregator};

/// Application state shared across HTTP handlers
///
/// Every dependency is built once at startup and shared by `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub assets: Arc<dyn AssetSource>,
    pub enrichment: Arc<EnrichmentEngine>,
    pub health: Arc<HealthAggregator>,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthGate>,
        assets: Arc<dyn AssetSource>,
        enrichment: Arc<EnrichmentEngine>,
        health: Arc<HealthAggregator>,
    ) -> Self {
        Self {
            auth,
            assets,
            enrichment,
            health,
        }
    }
}

/// Build application router
///
/// `/assets` requires a bearer token; `/health` is public. A panicking
/// handler answers 500 with the generic internal error body.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::get;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/assets", get(api::get_assets).delete(api::delete_assets))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::from_fn(api::request_logging))
        .layer(CorsLayer::permissive())
}

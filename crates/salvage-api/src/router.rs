//! Axum router construction for the game API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use salvage_core::GameBackend;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete router over any backend.
///
/// CORS allows any origin; the auth proxy in front of the server is the
/// access boundary.
pub fn build_router<B: GameBackend>(state: Arc<AppState<B>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Catalog
        .route("/api/catalog/resources", get(handlers::list_resources::<B>))
        .route("/api/catalog/buildings", get(handlers::list_buildings::<B>))
        // Player state
        .route("/api/inventory", get(handlers::inventory::<B>))
        .route("/api/harvester", get(handlers::harvester_status::<B>))
        .route("/api/harvester/harvest", post(handlers::harvest::<B>))
        .route("/api/buildings", get(handlers::owned_buildings::<B>))
        .route(
            "/api/buildings/{building_id}/collect",
            post(handlers::collect::<B>),
        )
        // Shop
        .route(
            "/api/shop/{building_type_id}/affordability",
            get(handlers::affordability::<B>),
        )
        .route(
            "/api/shop/{building_type_id}/purchase",
            post(handlers::purchase::<B>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

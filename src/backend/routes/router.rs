/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * Routes are added in a specific order:
 * 1. Message routes (channel reads and writes)
 * 2. Operational routes (cache stats, health)
 * 3. Fallback handler (404)
 */

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::messages::handlers::{get_cache_stats, reset_cache_stats};
use crate::backend::routes::message_routes::configure_message_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the pool, reader, and cache
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    // Start with message routes
    let router = configure_message_routes(Router::new());

    // Operational endpoints
    let router = router
        .route("/cache/stats", axum::routing::get(get_cache_stats))
        .route("/cache/stats/reset", axum::routing::post(reset_cache_stats))
        .route("/health", axum::routing::get(|| async { "OK" }));

    // Request tracing and 404 fallback
    let router = router
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" });

    // Use AppState as router state
    router.with_state(app_state)
}

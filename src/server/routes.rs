//! HTTP routes definition

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// API routes for topology, vehicles, requests, and rollback
///
/// - GET  /api/status                          - System status snapshot
/// - GET  /api/analytics                       - Aggregated analytics
/// - GET  /api/zones                           - List zones
/// - POST /api/zones                           - Add a zone
/// - POST /api/zones/:zone_id/areas            - Add an area to a zone
/// - POST /api/zones/:zone_id/areas/:area_id/slots - Add a slot to an area
/// - GET  /api/vehicles                        - List registered vehicles
/// - POST /api/vehicles                        - Register a vehicle
/// - GET  /api/requests                        - List requests (?state= filter)
/// - POST /api/requests                        - Create and enqueue a request
/// - POST /api/requests/process                - Process next queued request
/// - POST /api/requests/:id/allocate           - Allocate a slot
/// - POST /api/requests/:id/occupy             - Mark as occupied
/// - POST /api/requests/:id/release            - Release the slot
/// - POST /api/requests/:id/cancel             - Cancel the request
/// - POST /api/rollback                        - Roll back recent operations
pub fn api_routes() -> Router {
    Router::new()
        .route("/api/status", get(handlers::get_status))
        .route("/api/analytics", get(handlers::get_analytics))
        // Topology
        .route("/api/zones", get(handlers::list_zones))
        .route("/api/zones", post(handlers::create_zone))
        .route("/api/zones/:zone_id/areas", post(handlers::create_area))
        .route(
            "/api/zones/:zone_id/areas/:area_id/slots",
            post(handlers::create_slot),
        )
        // Vehicles
        .route("/api/vehicles", get(handlers::list_vehicles))
        .route("/api/vehicles", post(handlers::register_vehicle))
        // Request lifecycle
        .route("/api/requests", get(handlers::list_requests))
        .route("/api/requests", post(handlers::create_request))
        .route("/api/requests/process", post(handlers::process_next))
        .route(
            "/api/requests/:request_id/allocate",
            post(handlers::allocate_request),
        )
        .route(
            "/api/requests/:request_id/occupy",
            post(handlers::occupy_request),
        )
        .route(
            "/api/requests/:request_id/release",
            post(handlers::release_request),
        )
        .route(
            "/api/requests/:request_id/cancel",
            post(handlers::cancel_request),
        )
        // Undo
        .route("/api/rollback", post(handlers::rollback))
}

/// Health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/_health", get(handlers::health))
}

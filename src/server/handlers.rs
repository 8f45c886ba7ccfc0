//! HTTP route handlers
//!
//! One handler per API operation. Handlers take the system lock, apply a
//! single facade call, and translate the outcome: domain errors map onto
//! HTTP status codes, success onto per-concern response types.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::Error;
use crate::request::{ParkingRequest, RequestState};
use crate::server::AppState;
use crate::VERSION;

/// Map a domain error to its HTTP status
fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::DuplicateIdentifier(_) => StatusCode::CONFLICT,
        Error::CapacityExceeded(_) => StatusCode::CONFLICT,
        Error::NoSlotsAvailable(_) => StatusCode::CONFLICT,
        Error::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
    }
}

// ===== Request/Response Types =====

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub instance_id: String,
    pub uptime_secs: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateZoneRequest {
    pub zone_id: String,
    pub name: String,
    #[serde(default = "default_max_areas")]
    pub max_areas: usize,
}

fn default_max_areas() -> usize {
    4
}

#[derive(Debug, Deserialize)]
pub struct CreateAreaRequest {
    pub area_id: String,
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,
}

fn default_max_slots() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct CreateSlotRequest {
    pub slot_id: String,
}

#[derive(Debug, Serialize)]
pub struct TopologyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ZoneInfo {
    pub zone_id: String,
    pub name: String,
    pub areas: usize,
    pub total_slots: usize,
    pub available_slots: usize,
    pub occupied_slots: usize,
}

#[derive(Debug, Serialize)]
pub struct ZoneListResponse {
    pub success: bool,
    pub zones: Vec<ZoneInfo>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct RegisterVehicleRequest {
    pub vehicle_type: String,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub preferred_zone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleInfo {
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub preferred_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleListResponse {
    pub success: bool,
    pub vehicles: Vec<VehicleInfo>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateParkingRequest {
    pub vehicle_id: String,
    pub zone_id: String,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RequestInfo {
    pub request_id: String,
    pub vehicle_id: String,
    pub requested_zone: String,
    pub state: RequestState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_slot: Option<String>,
    pub cross_zone: bool,
    pub request_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,
    pub duration_minutes: f64,
}

impl RequestInfo {
    fn from_request(request: &ParkingRequest) -> Self {
        Self {
            request_id: request.id().to_string(),
            vehicle_id: request.vehicle_id().to_string(),
            requested_zone: request.zone_id().to_string(),
            state: request.state(),
            allocated_zone: request.slot_ref().map(|s| s.zone_id.clone()),
            allocated_slot: request.slot_ref().map(|s| s.slot_id.clone()),
            cross_zone: request.is_cross_zone(),
            request_time: request.request_time(),
            allocation_time: request.allocation_time(),
            release_time: request.release_time(),
            duration_minutes: request.duration_minutes(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub requests: Vec<RequestInfo>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub allocated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    pub cross_zone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RequestState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    #[serde(default = "default_rollback_count")]
    pub count: usize,
}

fn default_rollback_count() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct RollbackResponse {
    pub success: bool,
    /// Records actually consumed, counted even when an undo failed
    pub rolled_back: usize,
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ===== Health and Reporting =====

/// Liveness and build information
///
/// GET /health
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: VERSION,
        instance_id: state.instance_id.clone(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// System status snapshot
///
/// GET /api/status
#[instrument(skip(state))]
pub async fn get_status(Extension(state): Extension<Arc<AppState>>) -> Response {
    let status = state.system.read().status();
    Json(status).into_response()
}

/// Aggregated analytics
///
/// GET /api/analytics
#[instrument(skip(state))]
pub async fn get_analytics(Extension(state): Extension<Arc<AppState>>) -> Response {
    let analytics = state.system.read().analytics();
    Json(analytics).into_response()
}

// ===== Topology Handlers =====

/// List zones with their occupancy
///
/// GET /api/zones
#[instrument(skip(state))]
pub async fn list_zones(Extension(state): Extension<Arc<AppState>>) -> Response {
    let system = state.system.read();
    let zones: Vec<ZoneInfo> = system
        .hierarchy()
        .zones()
        .iter()
        .map(|zone| ZoneInfo {
            zone_id: zone.id().to_string(),
            name: zone.name().to_string(),
            areas: zone.areas().len(),
            total_slots: zone.total_slots(),
            available_slots: zone.available_slots(),
            occupied_slots: zone.occupied_slots(),
        })
        .collect();
    let count = zones.len();

    Json(ZoneListResponse {
        success: true,
        zones,
        count,
    })
    .into_response()
}

/// Add a zone
///
/// POST /api/zones
/// Body: {"zone_id": "Z4", "name": "Harbor", "max_areas": 2}
#[instrument(skip(state, payload))]
pub async fn create_zone(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CreateZoneRequest>,
) -> Response {
    info!(zone = %payload.zone_id, name = %payload.name, "Creating zone");

    let result =
        state
            .system
            .write()
            .add_zone(&payload.zone_id, &payload.name, payload.max_areas);
    match result {
        Ok(()) => Json(TopologyResponse {
            success: true,
            id: Some(payload.zone_id),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, zone = %payload.zone_id, "Failed to create zone");
            (
                error_status(&e),
                Json(TopologyResponse {
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Add an area to a zone
///
/// POST /api/zones/:zone_id/areas
/// Body: {"area_id": "A3", "max_slots": 5}
#[instrument(skip(state, payload))]
pub async fn create_area(
    Extension(state): Extension<Arc<AppState>>,
    Path(zone_id): Path<String>,
    Json(payload): Json<CreateAreaRequest>,
) -> Response {
    info!(zone = %zone_id, area = %payload.area_id, "Creating area");

    let result = state
        .system
        .write()
        .add_area(&zone_id, &payload.area_id, payload.max_slots);
    match result {
        Ok(()) => Json(TopologyResponse {
            success: true,
            id: Some(payload.area_id),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, zone = %zone_id, area = %payload.area_id, "Failed to create area");
            (
                error_status(&e),
                Json(TopologyResponse {
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Add a slot to an area
///
/// POST /api/zones/:zone_id/areas/:area_id/slots
/// Body: {"slot_id": "Z1-A3-S1"}
#[instrument(skip(state, payload))]
pub async fn create_slot(
    Extension(state): Extension<Arc<AppState>>,
    Path((zone_id, area_id)): Path<(String, String)>,
    Json(payload): Json<CreateSlotRequest>,
) -> Response {
    info!(zone = %zone_id, area = %area_id, slot = %payload.slot_id, "Creating slot");

    let result = state
        .system
        .write()
        .add_slot(&zone_id, &area_id, &payload.slot_id);
    match result {
        Ok(()) => Json(TopologyResponse {
            success: true,
            id: Some(payload.slot_id),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, zone = %zone_id, area = %area_id, "Failed to create slot");
            (
                error_status(&e),
                Json(TopologyResponse {
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

// ===== Vehicle Handlers =====

/// List registered vehicles
///
/// GET /api/vehicles
#[instrument(skip(state))]
pub async fn list_vehicles(Extension(state): Extension<Arc<AppState>>) -> Response {
    let system = state.system.read();
    let vehicles: Vec<VehicleInfo> = system
        .vehicles()
        .iter()
        .map(|vehicle| VehicleInfo {
            vehicle_id: vehicle.id().to_string(),
            vehicle_type: vehicle.vehicle_type().to_string(),
            preferred_zone: vehicle.preferred_zone().to_string(),
            license_plate: vehicle.license_plate().map(str::to_string),
            owner_name: vehicle.owner_name().map(str::to_string),
            registered_at: vehicle.registered_at(),
        })
        .collect();
    let count = vehicles.len();

    Json(VehicleListResponse {
        success: true,
        vehicles,
        count,
    })
    .into_response()
}

/// Register a vehicle
///
/// POST /api/vehicles
/// Body: {"vehicle_type": "Sedan", "license_plate": "1234",
///        "owner_name": "John Doe", "preferred_zone": "Z1"}
#[instrument(skip(state, payload))]
pub async fn register_vehicle(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<RegisterVehicleRequest>,
) -> Response {
    info!(kind = %payload.vehicle_type, "Registering vehicle");

    let result = state.system.write().register_vehicle(
        &payload.vehicle_type,
        payload.license_plate,
        payload.owner_name,
        payload.preferred_zone.as_deref(),
    );
    match result {
        Ok(vehicle_id) => Json(VehicleResponse {
            success: true,
            vehicle_id: Some(vehicle_id),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to register vehicle");
            (
                error_status(&e),
                Json(VehicleResponse {
                    success: false,
                    vehicle_id: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

// ===== Request Handlers =====

/// List requests, optionally filtered by state
///
/// GET /api/requests?state=ALLOCATED
#[instrument(skip(state))]
pub async fn list_requests(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ListRequestsQuery>,
) -> Response {
    let filter = match query.state.as_deref() {
        Some(raw) => match RequestState::from_str(raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                error!(error = %e, state = %raw, "Invalid state filter");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(RequestResponse {
                        success: false,
                        request_id: None,
                        error: Some(e.to_string()),
                    }),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let system = state.system.read();
    let requests: Vec<RequestInfo> = system
        .requests()
        .iter()
        .filter(|r| filter.map(|s| r.state() == s).unwrap_or(true))
        .map(RequestInfo::from_request)
        .collect();
    let count = requests.len();

    Json(RequestListResponse {
        success: true,
        requests,
        count,
    })
    .into_response()
}

/// Create and enqueue a parking request
///
/// POST /api/requests
/// Body: {"vehicle_id": "V1000", "zone_id": "Z1"}
#[instrument(skip(state, payload))]
pub async fn create_request(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CreateParkingRequest>,
) -> Response {
    info!(vehicle = %payload.vehicle_id, zone = %payload.zone_id, "Creating parking request");

    let result = state
        .system
        .write()
        .create_request(&payload.vehicle_id, &payload.zone_id);
    match result {
        Ok(request_id) => Json(RequestResponse {
            success: true,
            request_id: Some(request_id),
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, vehicle = %payload.vehicle_id, "Failed to create request");
            (
                error_status(&e),
                Json(RequestResponse {
                    success: false,
                    request_id: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Process the next queued request
///
/// POST /api/requests/process
#[instrument(skip(state))]
pub async fn process_next(Extension(state): Extension<Arc<AppState>>) -> Response {
    info!("Processing next queued request");

    let result = state.system.write().process_next_request();
    match result {
        Ok(outcome) => {
            let (zone_id, slot_id, cross_zone) = match &outcome.placement {
                Some(p) => (Some(p.zone_id.clone()), Some(p.slot_id.clone()), p.cross_zone),
                None => (None, None, false),
            };
            Json(AllocationResponse {
                success: true,
                request_id: Some(outcome.request_id.clone()),
                allocated: outcome.allocated(),
                zone_id,
                slot_id,
                cross_zone,
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to process request");
            (
                error_status(&e),
                Json(AllocationResponse {
                    success: false,
                    request_id: None,
                    allocated: false,
                    zone_id: None,
                    slot_id: None,
                    cross_zone: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Allocate a slot to a request
///
/// POST /api/requests/:request_id/allocate
#[instrument(skip(state))]
pub async fn allocate_request(
    Extension(state): Extension<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Response {
    info!(request = %request_id, "Allocating slot");

    let result = state.system.write().allocate_request(&request_id);
    match result {
        Ok(placement) => Json(AllocationResponse {
            success: true,
            request_id: Some(request_id),
            allocated: true,
            zone_id: Some(placement.zone_id),
            slot_id: Some(placement.slot_id),
            cross_zone: placement.cross_zone,
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, request = %request_id, "Failed to allocate");
            (
                error_status(&e),
                Json(AllocationResponse {
                    success: false,
                    request_id: Some(request_id),
                    allocated: false,
                    zone_id: None,
                    slot_id: None,
                    cross_zone: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Apply one lifecycle transition and report the resulting state
fn transition_response(
    state: &AppState,
    request_id: String,
    result: crate::Result<()>,
    action: &str,
) -> Response {
    match result {
        Ok(()) => {
            let current = state
                .system
                .read()
                .request(&request_id)
                .map(|r| r.state());
            Json(TransitionResponse {
                success: true,
                request_id: Some(request_id),
                state: current,
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, request = %request_id, "Failed to {} request", action);
            (
                error_status(&e),
                Json(TransitionResponse {
                    success: false,
                    request_id: Some(request_id),
                    state: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Mark a request as occupied
///
/// POST /api/requests/:request_id/occupy
#[instrument(skip(state))]
pub async fn occupy_request(
    Extension(state): Extension<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Response {
    info!(request = %request_id, "Marking request occupied");
    let result = state.system.write().mark_occupied(&request_id);
    transition_response(&state, request_id, result, "occupy")
}

/// Release a request's slot
///
/// POST /api/requests/:request_id/release
#[instrument(skip(state))]
pub async fn release_request(
    Extension(state): Extension<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Response {
    info!(request = %request_id, "Releasing request");
    let result = state.system.write().mark_released(&request_id);
    transition_response(&state, request_id, result, "release")
}

/// Cancel a request
///
/// POST /api/requests/:request_id/cancel
#[instrument(skip(state))]
pub async fn cancel_request(
    Extension(state): Extension<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> Response {
    info!(request = %request_id, "Cancelling request");
    let result = state.system.write().cancel_request(&request_id);
    transition_response(&state, request_id, result, "cancel")
}

// ===== Rollback Handler =====

/// Roll back the most recent operations
///
/// POST /api/rollback
/// Body: {"count": 2} (defaults to 1 when omitted)
#[instrument(skip(state, payload))]
pub async fn rollback(
    Extension(state): Extension<Arc<AppState>>,
    payload: Option<Json<RollbackRequest>>,
) -> Response {
    let count = payload.map(|Json(p)| p.count).unwrap_or(1);
    info!(count, "Rolling back operations");

    let mut system = state.system.write();
    let before = system.rollback_log().len();
    let result = system.rollback_last_k(count);
    let remaining = system.rollback_log().len();
    let rolled_back = before - remaining;
    drop(system);

    match result {
        Ok(()) => Json(RollbackResponse {
            success: true,
            rolled_back,
            remaining,
            error: None,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, count, "Rollback failed");
            (
                error_status(&e),
                Json(RollbackResponse {
                    success: false,
                    rolled_back,
                    remaining,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

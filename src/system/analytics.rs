//! Reporting snapshots
//!
//! Plain serializable views over the live system, computed on demand by
//! the facade. Nothing here holds references into the system; snapshots
//! stay valid after further mutations.

use serde::Serialize;

use crate::hierarchy::Zone;

/// Occupancy picture of one zone
#[derive(Debug, Clone, Serialize)]
pub struct ZoneUtilization {
    pub zone_id: String,
    pub name: String,
    pub total_slots: usize,
    pub available_slots: usize,
    pub occupied_slots: usize,
    /// Occupied share in percent; 0 for a zone with no slots
    pub utilization_percent: f64,
}

impl ZoneUtilization {
    pub fn for_zone(zone: &Zone) -> Self {
        let total = zone.total_slots();
        let occupied = zone.occupied_slots();
        let utilization_percent = if total > 0 {
            occupied as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        Self {
            zone_id: zone.id().to_string(),
            name: zone.name().to_string(),
            total_slots: total,
            available_slots: zone.available_slots(),
            occupied_slots: occupied,
            utilization_percent,
        }
    }
}

/// Top-level status snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub zone_count: usize,
    pub total_slots: usize,
    pub available_slots: usize,
    pub occupied_slots: usize,
    /// System-wide occupied share in percent
    pub utilization_percent: f64,
    pub zones: Vec<ZoneUtilization>,
    /// Requests waiting in the queue
    pub pending_requests: usize,
    /// All requests ever filed, terminal ones included
    pub total_requests: usize,
    /// Requests in REQUESTED, ALLOCATED, or OCCUPIED
    pub active_requests: usize,
    pub registered_vehicles: usize,
    /// Records currently available for rollback
    pub rollback_depth: usize,
}

/// Request totals broken down by lifecycle state
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestStateCounts {
    pub requested: usize,
    pub allocated: usize,
    pub occupied: usize,
    pub released: usize,
    pub cancelled: usize,
}

/// Requests targeting one zone
#[derive(Debug, Clone, Serialize)]
pub struct ZoneRequestCount {
    pub zone_id: String,
    pub requests: usize,
}

/// Aggregated reporting view
#[derive(Debug, Clone, Serialize)]
pub struct SystemAnalytics {
    pub zones: Vec<ZoneUtilization>,
    /// Zone with the highest utilization; absent while every zone is idle
    pub busiest_zone: Option<String>,
    pub total_requests: usize,
    /// Requests holding a slot right now (ALLOCATED or OCCUPIED)
    pub active_requests: usize,
    pub state_counts: RequestStateCounts,
    /// Allocations that landed outside their requested zone
    pub cross_zone_allocations: usize,
    /// Mean duration of RELEASED requests, in minutes
    pub average_duration_minutes: f64,
    /// Demand distribution by requested zone, in zone order
    pub requests_by_zone: Vec<ZoneRequestCount>,
}

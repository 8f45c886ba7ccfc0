//! System facade
//!
//! `ParkingSystem` owns every component and is the single entry point for
//! mutations: the capacity hierarchy, the allocation engine, the request
//! queue and directory, the vehicle registry, the id generator, and the
//! rollback log. Every method takes `&mut self` and either fully applies
//! or fully rejects. The facade itself is synchronous and single-threaded;
//! concurrent callers wrap the whole system in a lock at their boundary.

pub mod analytics;
pub mod config;
pub mod ids;

pub use analytics::{
    RequestStateCounts, SystemAnalytics, SystemStatus, ZoneRequestCount, ZoneUtilization,
};
pub use config::SystemConfig;
pub use ids::IdGenerator;

use tracing::{info, warn};

use crate::engine::{AllocationEngine, Placement};
use crate::error::{Error, Result};
use crate::hierarchy::CapacityHierarchy;
use crate::registry::{Vehicle, VehicleRegistry};
use crate::request::{ParkingRequest, RequestDirectory, RequestQueue, RequestState, SlotRef};
use crate::rollback::RollbackLog;

/// Type label recorded when a request auto-registers its vehicle
const AUTO_REGISTER_TYPE: &str = "Unknown";
/// Preferred zone used when a registration does not name one
const DEFAULT_PREFERRED_ZONE: &str = "Z1";

/// Result of taking one request off the queue.
///
/// `placement` is `None` when the system had no free slot anywhere; the
/// request then stays `REQUESTED` and can be retried through
/// [`ParkingSystem::allocate_request`] once capacity frees up.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub request_id: String,
    pub placement: Option<Placement>,
}

impl ProcessOutcome {
    pub fn allocated(&self) -> bool {
        self.placement.is_some()
    }
}

/// Orchestrator over the hierarchy, requests, vehicles, and rollback log.
#[derive(Debug, Clone)]
pub struct ParkingSystem {
    config: SystemConfig,
    hierarchy: CapacityHierarchy,
    engine: AllocationEngine,
    queue: RequestQueue,
    directory: RequestDirectory,
    registry: VehicleRegistry,
    rollback: RollbackLog,
    ids: IdGenerator,
}

impl ParkingSystem {
    /// Create an empty system with the given capacity bounds.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            hierarchy: CapacityHierarchy::new(config.max_zones),
            engine: AllocationEngine::new(),
            queue: RequestQueue::new(config.queue_capacity),
            directory: RequestDirectory::new(),
            registry: VehicleRegistry::new(config.vehicle_capacity),
            rollback: RollbackLog::new(config.rollback_capacity),
            ids: IdGenerator::new(),
            config,
        }
    }

    /// Create a system pre-seeded with the standard three-zone topology.
    pub fn with_default_topology() -> Result<Self> {
        let mut system = Self::new(SystemConfig::default());
        system.seed_default_topology()?;
        Ok(system)
    }

    /// Seed Z1 "Downtown" (A1: 3 slots, A2: 2), Z2 "Uptown" (B1: 2) and
    /// Z3 "Midtown" (C1: 3), ten slots total.
    pub fn seed_default_topology(&mut self) -> Result<()> {
        self.add_zone("Z1", "Downtown", 3)?;
        self.add_zone("Z2", "Uptown", 2)?;
        self.add_zone("Z3", "Midtown", 2)?;

        self.add_area("Z1", "A1", 3)?;
        self.add_area("Z1", "A2", 2)?;
        self.add_area("Z2", "B1", 2)?;
        self.add_area("Z3", "C1", 3)?;

        for slot_id in ["Z1-A1-S1", "Z1-A1-S2", "Z1-A1-S3"] {
            self.add_slot("Z1", "A1", slot_id)?;
        }
        for slot_id in ["Z1-A2-S1", "Z1-A2-S2"] {
            self.add_slot("Z1", "A2", slot_id)?;
        }
        for slot_id in ["Z2-B1-S1", "Z2-B1-S2"] {
            self.add_slot("Z2", "B1", slot_id)?;
        }
        for slot_id in ["Z3-C1-S1", "Z3-C1-S2", "Z3-C1-S3"] {
            self.add_slot("Z3", "C1", slot_id)?;
        }

        info!(
            zones = self.hierarchy.zone_count(),
            slots = self.hierarchy.total_slots(),
            "Seeded default topology"
        );
        Ok(())
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ===== Topology =====

    pub fn add_zone(&mut self, zone_id: &str, name: &str, max_areas: usize) -> Result<()> {
        self.hierarchy.add_zone(zone_id, name, max_areas)
    }

    pub fn add_area(&mut self, zone_id: &str, area_id: &str, max_slots: usize) -> Result<()> {
        self.hierarchy.add_area(zone_id, area_id, max_slots)
    }

    pub fn add_slot(&mut self, zone_id: &str, area_id: &str, slot_id: &str) -> Result<()> {
        self.hierarchy.add_slot(zone_id, area_id, slot_id)
    }

    pub fn hierarchy(&self) -> &CapacityHierarchy {
        &self.hierarchy
    }

    // ===== Vehicles =====

    /// Register a vehicle, returning its generated `V<n>` id.
    pub fn register_vehicle(
        &mut self,
        vehicle_type: &str,
        license_plate: Option<String>,
        owner_name: Option<String>,
        preferred_zone: Option<&str>,
    ) -> Result<String> {
        let preferred = preferred_zone.unwrap_or(DEFAULT_PREFERRED_ZONE);
        let id = self.ids.next_vehicle_id();
        self.registry.register(Vehicle::with_details(
            &id,
            vehicle_type,
            preferred,
            license_plate,
            owner_name,
        ))?;
        info!(vehicle = %id, kind = %vehicle_type, zone = %preferred, "Vehicle registered");
        Ok(id)
    }

    pub fn vehicle(&self, vehicle_id: &str) -> Option<&Vehicle> {
        self.registry.find(vehicle_id)
    }

    /// Vehicles in registration order
    pub fn vehicles(&self) -> &[Vehicle] {
        self.registry.vehicles()
    }

    // ===== Requests =====

    /// File a parking request for `vehicle_id` targeting `zone_id` and
    /// enqueue it, returning the generated `R<n>` id.
    ///
    /// Unknown vehicle ids are registered on the fly with the requested
    /// zone as their preference, unless auto-registration is disabled in
    /// the configuration.
    pub fn create_request(&mut self, vehicle_id: &str, zone_id: &str) -> Result<String> {
        if self.hierarchy.zone(zone_id).is_none() {
            return Err(Error::NotFound(format!("Zone {} not found", zone_id)));
        }

        if !self.registry.contains(vehicle_id) {
            if self.config.auto_register_vehicles {
                self.registry
                    .register(Vehicle::new(vehicle_id, AUTO_REGISTER_TYPE, zone_id))?;
                info!(vehicle = %vehicle_id, zone = %zone_id, "Auto-registered vehicle");
            } else {
                return Err(Error::NotFound(format!(
                    "Vehicle {} is not registered",
                    vehicle_id
                )));
            }
        }

        let request_id = self.ids.next_request_id();
        self.directory
            .add(ParkingRequest::new(&request_id, vehicle_id, zone_id))?;
        if let Err(e) = self.queue.enqueue(&request_id) {
            // Rejected admission must not leave a stray directory entry
            self.directory.remove(&request_id);
            return Err(e);
        }

        info!(
            request = %request_id,
            vehicle = %vehicle_id,
            zone = %zone_id,
            "Parking request created"
        );
        Ok(request_id)
    }

    /// Take the oldest queued request and attempt to allocate it.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the queue is empty or the dequeued
    /// id no longer resolves, and `Error::InvalidState` when the request
    /// left `REQUESTED` while it was queued (for example a cancellation).
    /// A full system is not an error here; see [`ProcessOutcome`].
    pub fn process_next_request(&mut self) -> Result<ProcessOutcome> {
        let request_id = self
            .queue
            .dequeue()
            .ok_or_else(|| Error::NotFound("No pending requests in queue".to_string()))?;

        match self.allocate_request(&request_id) {
            Ok(placement) => Ok(ProcessOutcome {
                request_id,
                placement: Some(placement),
            }),
            Err(Error::NoSlotsAvailable(_)) => {
                warn!(request = %request_id, "No free slot for dequeued request");
                Ok(ProcessOutcome {
                    request_id,
                    placement: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Allocate a slot to a `REQUESTED` request, recording the operation
    /// in the rollback log.
    pub fn allocate_request(&mut self, request_id: &str) -> Result<Placement> {
        let request = self
            .directory
            .find(request_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
        if request.state() != RequestState::Requested {
            return Err(Error::InvalidState(format!(
                "Request {} cannot be allocated from state {}",
                request_id,
                request.state()
            )));
        }
        let requested_zone = request.zone_id().to_string();

        let placement = self.engine.find_slot(&self.hierarchy, &requested_zone)?;

        let slot = self
            .hierarchy
            .slot_mut(&placement.zone_id, &placement.slot_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Slot {} not found in zone {}",
                    placement.slot_id, placement.zone_id
                ))
            })?;
        let request = self
            .directory
            .find_mut(request_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
        request.allocate(slot, placement.cross_zone)?;

        self.rollback.record_allocation(
            request_id,
            SlotRef {
                zone_id: placement.zone_id.clone(),
                slot_id: placement.slot_id.clone(),
            },
        );
        info!(
            request = %request_id,
            zone = %placement.zone_id,
            slot = %placement.slot_id,
            cross_zone = placement.cross_zone,
            "Slot allocated"
        );
        Ok(placement)
    }

    /// Mark an `ALLOCATED` request as parked.
    pub fn mark_occupied(&mut self, request_id: &str) -> Result<()> {
        let request = self
            .directory
            .find_mut(request_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
        let previous = request.state();
        request.mark_occupied()?;

        self.rollback.record_state_change(request_id, previous);
        info!(request = %request_id, "Request marked OCCUPIED");
        Ok(())
    }

    /// Release an `OCCUPIED` request, freeing its slot.
    pub fn mark_released(&mut self, request_id: &str) -> Result<()> {
        let request = self
            .directory
            .find(request_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
        let previous = request.state();
        if previous != RequestState::Occupied {
            return Err(Error::InvalidState(format!(
                "Request {} cannot be released from state {}",
                request_id, previous
            )));
        }
        let slot_ref = request.slot_ref().cloned().ok_or_else(|| {
            Error::InvalidState(format!("Request {} holds no slot", request_id))
        })?;

        let slot = self
            .hierarchy
            .slot_mut(&slot_ref.zone_id, &slot_ref.slot_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Slot {} not found in zone {}",
                    slot_ref.slot_id, slot_ref.zone_id
                ))
            })?;
        let request = self
            .directory
            .find_mut(request_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
        request.mark_released(slot)?;
        let minutes = request.duration_minutes();

        self.rollback.record_state_change(request_id, previous);
        info!(
            request = %request_id,
            slot = %slot_ref,
            duration_minutes = minutes,
            "Request released"
        );
        Ok(())
    }

    /// Cancel a `REQUESTED` or `ALLOCATED` request, freeing any held slot.
    ///
    /// A cancelled request keeps its place in the queue if it has one; the
    /// stale entry is reported when it is eventually processed.
    pub fn cancel_request(&mut self, request_id: &str) -> Result<()> {
        let request = self
            .directory
            .find(request_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
        let previous = request.state();
        let freed_slot = if previous == RequestState::Allocated {
            request.slot_ref().cloned()
        } else {
            None
        };

        match &freed_slot {
            Some(slot_ref) => {
                let slot = self
                    .hierarchy
                    .slot_mut(&slot_ref.zone_id, &slot_ref.slot_id)
                    .ok_or_else(|| {
                        Error::NotFound(format!(
                            "Slot {} not found in zone {}",
                            slot_ref.slot_id, slot_ref.zone_id
                        ))
                    })?;
                let request = self
                    .directory
                    .find_mut(request_id)
                    .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
                request.cancel(Some(slot))?;
            }
            None => {
                let request = self
                    .directory
                    .find_mut(request_id)
                    .ok_or_else(|| Error::NotFound(format!("Request {} not found", request_id)))?;
                request.cancel(None)?;
            }
        }

        self.rollback
            .record_cancellation(request_id, previous, freed_slot);
        info!(request = %request_id, previous = %previous, "Request cancelled");
        Ok(())
    }

    pub fn request(&self, request_id: &str) -> Option<&ParkingRequest> {
        self.directory.find(request_id)
    }

    /// All filed requests in creation order, terminal ones included
    pub fn requests(&self) -> &[ParkingRequest] {
        self.directory.requests()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    // ===== Rollback =====

    /// Undo the most recent recorded operation.
    pub fn rollback_last(&mut self) -> Result<()> {
        self.rollback
            .rollback_last(&mut self.directory, &mut self.hierarchy)
    }

    /// Undo the `k` most recent recorded operations.
    pub fn rollback_last_k(&mut self, k: usize) -> Result<()> {
        self.rollback
            .rollback_last_k(k, &mut self.directory, &mut self.hierarchy)
    }

    pub fn rollback_log(&self) -> &RollbackLog {
        &self.rollback
    }

    // ===== Reporting =====

    /// Point-in-time occupancy and workload snapshot.
    pub fn status(&self) -> SystemStatus {
        let zones: Vec<ZoneUtilization> = self
            .hierarchy
            .zones()
            .iter()
            .map(ZoneUtilization::for_zone)
            .collect();
        let total = self.hierarchy.total_slots();
        let occupied = self.hierarchy.occupied_slots();
        let utilization_percent = if total > 0 {
            occupied as f64 * 100.0 / total as f64
        } else {
            0.0
        };

        SystemStatus {
            zone_count: self.hierarchy.zone_count(),
            total_slots: total,
            available_slots: self.hierarchy.available_slots(),
            occupied_slots: occupied,
            utilization_percent,
            zones,
            pending_requests: self.queue.len(),
            total_requests: self.directory.len(),
            active_requests: self
                .directory
                .requests()
                .iter()
                .filter(|r| r.is_active())
                .count(),
            registered_vehicles: self.registry.len(),
            rollback_depth: self.rollback.len(),
        }
    }

    /// Aggregated request and occupancy analytics.
    pub fn analytics(&self) -> SystemAnalytics {
        let zones: Vec<ZoneUtilization> = self
            .hierarchy
            .zones()
            .iter()
            .map(ZoneUtilization::for_zone)
            .collect();

        // First zone with the strictly highest utilization; zones at 0%
        // never qualify
        let mut busiest: Option<&ZoneUtilization> = None;
        for zone in &zones {
            let best = busiest.map(|b| b.utilization_percent).unwrap_or(0.0);
            if zone.utilization_percent > best {
                busiest = Some(zone);
            }
        }
        let busiest_zone = busiest.map(|z| z.zone_id.clone());

        let state_counts = RequestStateCounts {
            requested: self.directory.count_by_state(RequestState::Requested),
            allocated: self.directory.count_by_state(RequestState::Allocated),
            occupied: self.directory.count_by_state(RequestState::Occupied),
            released: self.directory.count_by_state(RequestState::Released),
            cancelled: self.directory.count_by_state(RequestState::Cancelled),
        };
        let active_requests = state_counts.allocated + state_counts.occupied;

        let requests_by_zone = self
            .hierarchy
            .zones()
            .iter()
            .map(|zone| ZoneRequestCount {
                zone_id: zone.id().to_string(),
                requests: self
                    .directory
                    .requests()
                    .iter()
                    .filter(|r| r.zone_id() == zone.id())
                    .count(),
            })
            .collect();

        SystemAnalytics {
            zones,
            busiest_zone,
            total_requests: self.directory.len(),
            active_requests,
            state_counts,
            cross_zone_allocations: self.directory.cross_zone_count(),
            average_duration_minutes: self.directory.average_completed_duration(),
            requests_by_zone,
        }
    }

    /// Discard all zones, requests, vehicles, and history, keeping the
    /// configured bounds.
    pub fn reset(&mut self) {
        info!("Resetting parking system");
        *self = Self::new(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topology_totals() {
        let system = ParkingSystem::with_default_topology().expect("seed");
        assert_eq!(system.hierarchy().zone_count(), 3);
        assert_eq!(system.hierarchy().total_slots(), 10);
        assert_eq!(system.hierarchy().available_slots(), 10);
    }

    #[test]
    fn test_register_vehicle_generates_sequential_ids() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let v1 = system
            .register_vehicle("Sedan", Some("1234".to_string()), None, Some("Z1"))
            .expect("register");
        let v2 = system
            .register_vehicle("SUV", None, None, None)
            .expect("register");
        assert_eq!(v1, "V1000");
        assert_eq!(v2, "V1001");
        assert_eq!(
            system.vehicle("V1001").expect("vehicle").preferred_zone(),
            "Z1"
        );
    }

    #[test]
    fn test_create_request_auto_registers_vehicle() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let request_id = system.create_request("CAR42", "Z2").expect("create");
        assert_eq!(request_id, "R1000");
        assert_eq!(system.queue().len(), 1);

        let vehicle = system.vehicle("CAR42").expect("auto-registered");
        assert_eq!(vehicle.vehicle_type(), "Unknown");
        assert_eq!(vehicle.preferred_zone(), "Z2");
    }

    #[test]
    fn test_create_request_unknown_zone() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let err = system.create_request("CAR42", "Z9").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(system.queue().len(), 0);
        assert_eq!(system.requests().len(), 0);
    }

    #[test]
    fn test_create_request_without_auto_register() {
        let config = SystemConfig {
            auto_register_vehicles: false,
            ..SystemConfig::default()
        };
        let mut system = ParkingSystem::new(config);
        system.seed_default_topology().expect("seed");

        let err = system.create_request("CAR42", "Z1").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        system
            .register_vehicle("Sedan", None, None, Some("Z1"))
            .expect("register");
        system.create_request("V1000", "Z1").expect("create");
    }

    #[test]
    fn test_full_queue_leaves_no_directory_entry() {
        let config = SystemConfig {
            queue_capacity: 1,
            ..SystemConfig::default()
        };
        let mut system = ParkingSystem::new(config);
        system.seed_default_topology().expect("seed");

        system.create_request("CAR1", "Z1").expect("create");
        let err = system.create_request("CAR2", "Z1").unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded(_)));
        assert_eq!(system.requests().len(), 1);
    }

    #[test]
    fn test_process_allocates_in_fifo_order() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let r1 = system.create_request("CAR1", "Z2").expect("create");
        let r2 = system.create_request("CAR2", "Z2").expect("create");

        let first = system.process_next_request().expect("process");
        assert_eq!(first.request_id, r1);
        let placement = first.placement.expect("allocated");
        assert_eq!(placement.slot_id, "Z2-B1-S1");
        assert!(!placement.cross_zone);

        let second = system.process_next_request().expect("process");
        assert_eq!(second.request_id, r2);
        assert_eq!(second.placement.expect("allocated").slot_id, "Z2-B1-S2");
    }

    #[test]
    fn test_process_empty_queue_fails() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let err = system.process_next_request().unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_process_overflows_across_zones() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        for i in 0..3 {
            system
                .create_request(&format!("CAR{}", i), "Z2")
                .expect("create");
        }
        system.process_next_request().expect("process");
        system.process_next_request().expect("process");

        // Z2 is full; the third request spills into Z3, the next zone over
        let outcome = system.process_next_request().expect("process");
        let placement = outcome.placement.expect("allocated");
        assert_eq!(placement.zone_id, "Z3");
        assert!(placement.cross_zone);
        assert!(system
            .request(&outcome.request_id)
            .expect("request")
            .is_cross_zone());
    }

    #[test]
    fn test_process_with_full_system_leaves_request_pending() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        for i in 0..11 {
            system
                .create_request(&format!("CAR{}", i), "Z1")
                .expect("create");
        }
        for _ in 0..10 {
            assert!(system.process_next_request().expect("process").allocated());
        }

        let outcome = system.process_next_request().expect("process");
        assert!(!outcome.allocated());
        assert_eq!(
            system.request(&outcome.request_id).expect("request").state(),
            RequestState::Requested
        );
        assert_eq!(system.queue().len(), 0);
    }

    #[test]
    fn test_lifecycle_and_rollback_round_trip() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let request_id = system.create_request("CAR1", "Z1").expect("create");
        system.process_next_request().expect("process");
        system.mark_occupied(&request_id).expect("occupy");
        system.mark_released(&request_id).expect("release");

        assert_eq!(
            system.request(&request_id).expect("request").state(),
            RequestState::Released
        );
        assert_eq!(system.hierarchy().available_slots(), 10);
        assert_eq!(system.rollback_log().len(), 3);

        // Undo the release, then the occupancy
        system.rollback_last().expect("undo release");
        assert_eq!(
            system.request(&request_id).expect("request").state(),
            RequestState::Occupied
        );
        system.rollback_last().expect("undo occupy");
        assert_eq!(
            system.request(&request_id).expect("request").state(),
            RequestState::Allocated
        );
    }

    #[test]
    fn test_cancel_allocated_frees_slot_and_rollback_restores() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let request_id = system.create_request("CAR1", "Z1").expect("create");
        system.process_next_request().expect("process");
        assert_eq!(system.hierarchy().available_slots(), 9);

        system.cancel_request(&request_id).expect("cancel");
        assert_eq!(system.hierarchy().available_slots(), 10);
        assert_eq!(
            system.request(&request_id).expect("request").state(),
            RequestState::Cancelled
        );

        system.rollback_last().expect("undo cancel");
        assert_eq!(system.hierarchy().available_slots(), 9);
        let request = system.request(&request_id).expect("request");
        assert_eq!(request.state(), RequestState::Allocated);
        assert_eq!(
            system
                .hierarchy()
                .slot("Z1", "Z1-A1-S1")
                .expect("slot")
                .vehicle_id(),
            Some("CAR1")
        );
    }

    #[test]
    fn test_cancelled_request_reported_when_processed() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        let request_id = system.create_request("CAR1", "Z1").expect("create");
        system.cancel_request(&request_id).expect("cancel");

        // The id is still queued; processing it surfaces the stale state
        let err = system.process_next_request().unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(system.queue().len(), 0);
    }

    #[test]
    fn test_analytics_after_scripted_flow() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        for i in 0..3 {
            system
                .create_request(&format!("CAR{}", i), "Z2")
                .expect("create");
        }
        for _ in 0..3 {
            system.process_next_request().expect("process");
        }

        let analytics = system.analytics();
        assert_eq!(analytics.total_requests, 3);
        assert_eq!(analytics.active_requests, 3);
        assert_eq!(analytics.state_counts.allocated, 3);
        assert_eq!(analytics.cross_zone_allocations, 1);
        // Z2 runs at 100%, ahead of Z3's single overflow slot
        assert_eq!(analytics.busiest_zone.as_deref(), Some("Z2"));
        let z2_demand = analytics
            .requests_by_zone
            .iter()
            .find(|z| z.zone_id == "Z2")
            .expect("zone present");
        assert_eq!(z2_demand.requests, 3);
    }

    #[test]
    fn test_busiest_zone_absent_when_idle() {
        let system = ParkingSystem::with_default_topology().expect("seed");
        assert_eq!(system.analytics().busiest_zone, None);
        assert_eq!(system.analytics().average_duration_minutes, 0.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut system = ParkingSystem::with_default_topology().expect("seed");
        system.create_request("CAR1", "Z1").expect("create");
        system.process_next_request().expect("process");

        system.reset();
        assert_eq!(system.hierarchy().zone_count(), 0);
        assert_eq!(system.requests().len(), 0);
        assert_eq!(system.queue().len(), 0);
        assert_eq!(system.rollback_log().len(), 0);
        // Bounds survive the reset
        assert_eq!(system.config().queue_capacity, 100);
    }
}

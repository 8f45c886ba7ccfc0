//! Allocation engine
//!
//! Answers "give me a slot for this request" with a two-phase search over
//! the capacity hierarchy:
//!
//! 1. **Same-zone phase**: scan the requested zone's areas in insertion
//!    order and take the first free slot.
//! 2. **Cross-zone phase**: starting from the zone immediately after the
//!    requested one, walk the zone list circularly until a zone with free
//!    capacity turns up, then first-fit inside it.
//!
//! The engine never mutates the hierarchy. It returns a [`Placement`]
//! naming the chosen slot; claiming the slot is the request transition's
//! job, so slot state and request state change together or not at all.

use tracing::debug;

use crate::error::{Error, Result};
use crate::hierarchy::CapacityHierarchy;

/// Where an allocation search landed.
///
/// Carries identifiers only; the slot is re-resolved through the hierarchy
/// when it is actually claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Zone the slot lives in (not necessarily the requested zone)
    pub zone_id: String,
    /// The chosen slot
    pub slot_id: String,
    /// True when the slot is outside the requested zone
    pub cross_zone: bool,
}

/// Two-phase first-fit slot search.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine;

impl AllocationEngine {
    /// Create an allocation engine
    pub fn new() -> Self {
        Self
    }

    /// Find a free slot for a request targeting `requested_zone`.
    ///
    /// Zones, areas and slots are visited in insertion order, so the result
    /// is deterministic for a given hierarchy state. The requested zone is
    /// never re-visited by the cross-zone walk and is never mutated by it.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the requested zone does not exist and
    /// `Error::NoSlotsAvailable` when the same-zone and cross-zone phases
    /// both come up empty.
    pub fn find_slot(
        &self,
        hierarchy: &CapacityHierarchy,
        requested_zone: &str,
    ) -> Result<Placement> {
        let start = hierarchy.zone_index(requested_zone).ok_or_else(|| {
            Error::NotFound(format!("Zone {} not found", requested_zone))
        })?;
        let zones = hierarchy.zones();

        // Same-zone phase
        if let Some(slot) = zones[start].first_available() {
            debug!(zone = %requested_zone, slot = %slot.id(), "Same-zone slot found");
            return Ok(Placement {
                zone_id: requested_zone.to_string(),
                slot_id: slot.id().to_string(),
                cross_zone: false,
            });
        }

        // Cross-zone phase: circular walk starting after the requested zone,
        // wrapping past the end of the zone list
        for offset in 1..zones.len() {
            let zone = &zones[(start + offset) % zones.len()];
            if zone.available_slots() == 0 {
                continue;
            }
            if let Some(slot) = zone.first_available() {
                debug!(
                    requested = %requested_zone,
                    zone = %zone.id(),
                    slot = %slot.id(),
                    "Cross-zone slot found"
                );
                return Ok(Placement {
                    zone_id: zone.id().to_string(),
                    slot_id: slot.id().to_string(),
                    cross_zone: true,
                });
            }
        }

        debug!(zone = %requested_zone, "All zones exhausted");
        Err(Error::NoSlotsAvailable(format!(
            "No free slots in any zone for a request targeting {}",
            requested_zone
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy() -> CapacityHierarchy {
        let mut h = CapacityHierarchy::new(10);
        h.add_zone("Z1", "Downtown", 4).expect("zone");
        h.add_zone("Z2", "Uptown", 4).expect("zone");
        h.add_zone("Z3", "Midtown", 4).expect("zone");
        h.add_area("Z1", "A1", 3).expect("area");
        h.add_area("Z2", "B1", 2).expect("area");
        h.add_area("Z3", "C1", 2).expect("area");
        for i in 1..=3 {
            h.add_slot("Z1", "A1", &format!("A1-{}", i)).expect("slot");
        }
        for i in 1..=2 {
            h.add_slot("Z2", "B1", &format!("B1-{}", i)).expect("slot");
        }
        for i in 1..=2 {
            h.add_slot("Z3", "C1", &format!("C1-{}", i)).expect("slot");
        }
        h
    }

    fn fill_zone(h: &mut CapacityHierarchy, zone_id: &str) {
        let slot_ids: Vec<String> = h
            .zone(zone_id)
            .expect("zone exists")
            .areas()
            .iter()
            .flat_map(|a| a.slots().iter().map(|s| s.id().to_string()))
            .collect();
        for (i, slot_id) in slot_ids.iter().enumerate() {
            h.slot_mut(zone_id, slot_id)
                .expect("slot exists")
                .occupy(&format!("V{}", i))
                .expect("occupy");
        }
    }

    #[test]
    fn test_same_zone_first_fit() {
        let h = hierarchy();
        let engine = AllocationEngine::new();

        let placement = engine.find_slot(&h, "Z1").expect("placement");
        assert_eq!(placement.zone_id, "Z1");
        assert_eq!(placement.slot_id, "A1-1");
        assert!(!placement.cross_zone);
    }

    #[test]
    fn test_same_zone_skips_occupied() {
        let mut h = hierarchy();
        h.slot_mut("Z1", "A1-1")
            .expect("slot")
            .occupy("V1")
            .expect("occupy");

        let engine = AllocationEngine::new();
        let placement = engine.find_slot(&h, "Z1").expect("placement");
        assert_eq!(placement.slot_id, "A1-2");
        assert!(!placement.cross_zone);
    }

    #[test]
    fn test_cross_zone_picks_next_zone_in_order() {
        let mut h = hierarchy();
        fill_zone(&mut h, "Z1");

        let engine = AllocationEngine::new();
        let placement = engine.find_slot(&h, "Z1").expect("placement");
        // Z2 comes immediately after Z1, so it wins over Z3
        assert_eq!(placement.zone_id, "Z2");
        assert_eq!(placement.slot_id, "B1-1");
        assert!(placement.cross_zone);
    }

    #[test]
    fn test_cross_zone_wraps_past_end() {
        let mut h = hierarchy();
        fill_zone(&mut h, "Z3");

        let engine = AllocationEngine::new();
        let placement = engine.find_slot(&h, "Z3").expect("placement");
        // The walk restarts at the front of the zone list
        assert_eq!(placement.zone_id, "Z1");
        assert_eq!(placement.slot_id, "A1-1");
        assert!(placement.cross_zone);
    }

    #[test]
    fn test_cross_zone_skips_full_zones() {
        let mut h = hierarchy();
        fill_zone(&mut h, "Z1");
        fill_zone(&mut h, "Z2");

        let engine = AllocationEngine::new();
        let placement = engine.find_slot(&h, "Z1").expect("placement");
        assert_eq!(placement.zone_id, "Z3");
        assert!(placement.cross_zone);
    }

    #[test]
    fn test_all_zones_full() {
        let mut h = hierarchy();
        fill_zone(&mut h, "Z1");
        fill_zone(&mut h, "Z2");
        fill_zone(&mut h, "Z3");
        let available_before = h.available_slots();

        let engine = AllocationEngine::new();
        let err = engine.find_slot(&h, "Z2").unwrap_err();
        assert!(matches!(err, Error::NoSlotsAvailable(_)));
        // The search mutates nothing
        assert_eq!(h.available_slots(), available_before);
    }

    #[test]
    fn test_unknown_zone() {
        let h = hierarchy();
        let engine = AllocationEngine::new();
        let err = engine.find_slot(&h, "Z9").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_single_full_zone_has_no_fallback() {
        let mut h = CapacityHierarchy::new(2);
        h.add_zone("Z1", "Downtown", 1).expect("zone");
        h.add_area("Z1", "A1", 1).expect("area");
        h.add_slot("Z1", "A1", "A1-1").expect("slot");
        fill_zone(&mut h, "Z1");

        let engine = AllocationEngine::new();
        let err = engine.find_slot(&h, "Z1").unwrap_err();
        assert!(matches!(err, Error::NoSlotsAvailable(_)));
    }
}

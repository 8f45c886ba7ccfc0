//! Zones, the top level of the capacity hierarchy

use crate::error::{Error, Result};

use super::area::ParkingArea;
use super::slot::ParkingSlot;

/// A top-level geographic partition containing areas.
///
/// Areas are kept in insertion order, which is the order the allocation
/// search visits them. Slot totals are always derived by summing over the
/// areas, never cached, so they cannot drift from the actual slot entities.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Unique ID, system-wide
    id: String,
    /// Human-readable display name
    name: String,
    areas: Vec<ParkingArea>,
    max_areas: usize,
}

impl Zone {
    /// Create an empty zone with an area capacity
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_areas: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            areas: Vec::new(),
            max_areas,
        }
    }

    /// Zone identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of areas this zone accepts
    pub fn max_areas(&self) -> usize {
        self.max_areas
    }

    /// Add an area at the end of the search order.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExceeded` when the zone already holds its
    /// maximum number of areas and `Error::DuplicateIdentifier` when the
    /// area ID is already present in this zone.
    pub fn add_area(&mut self, area_id: &str, max_slots: usize) -> Result<()> {
        if self.areas.len() >= self.max_areas {
            return Err(Error::CapacityExceeded(format!(
                "Zone {} is full ({} areas)",
                self.id, self.max_areas
            )));
        }
        if self.area(area_id).is_some() {
            return Err(Error::DuplicateIdentifier(format!(
                "Area {} already exists in zone {}",
                area_id, self.id
            )));
        }
        self.areas
            .push(ParkingArea::new(area_id, self.id.clone(), max_slots));
        Ok(())
    }

    /// Add a slot to an area of this zone.
    ///
    /// Slot IDs are unique zone-wide, not just within one area, because
    /// undo records resolve slots by (zone, slot) pairs.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown area,
    /// `Error::DuplicateIdentifier` when the slot ID exists anywhere in the
    /// zone, and `Error::CapacityExceeded` when the area is full.
    pub fn add_slot(&mut self, area_id: &str, slot_id: &str) -> Result<()> {
        if self.find_slot(slot_id).is_some() {
            return Err(Error::DuplicateIdentifier(format!(
                "Slot {} already exists in zone {}",
                slot_id, self.id
            )));
        }
        let area = self.area_mut(area_id).ok_or_else(|| {
            Error::NotFound(format!("Area {} not found in zone", area_id))
        })?;
        area.add_slot(slot_id)
    }

    /// Areas in insertion order
    pub fn areas(&self) -> &[ParkingArea] {
        &self.areas
    }

    /// Look up an area by ID
    pub fn area(&self, area_id: &str) -> Option<&ParkingArea> {
        self.areas.iter().find(|a| a.id() == area_id)
    }

    /// Look up an area by ID for mutation
    pub fn area_mut(&mut self, area_id: &str) -> Option<&mut ParkingArea> {
        self.areas.iter_mut().find(|a| a.id() == area_id)
    }

    /// Look up a slot anywhere in this zone
    pub fn find_slot(&self, slot_id: &str) -> Option<&ParkingSlot> {
        self.areas.iter().find_map(|a| a.slot(slot_id))
    }

    /// Look up a slot anywhere in this zone for mutation
    pub fn find_slot_mut(&mut self, slot_id: &str) -> Option<&mut ParkingSlot> {
        self.areas.iter_mut().find_map(|a| a.slot_mut(slot_id))
    }

    /// First free slot, scanning areas and slots in insertion order
    pub fn first_available(&self) -> Option<&ParkingSlot> {
        self.areas.iter().find_map(|a| a.first_available())
    }

    /// Total slots in this zone, summed over areas
    pub fn total_slots(&self) -> usize {
        self.areas.iter().map(|a| a.total_slots()).sum()
    }

    /// Free slots in this zone, summed over areas
    pub fn available_slots(&self) -> usize {
        self.areas.iter().map(|a| a.available_slots()).sum()
    }

    /// Occupied slots in this zone
    pub fn occupied_slots(&self) -> usize {
        self.total_slots() - self.available_slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_with_slots() -> Zone {
        let mut zone = Zone::new("Z1", "Downtown", 4);
        zone.add_area("A1", 3).expect("add area");
        zone.add_area("A2", 2).expect("add area");
        zone.add_slot("A1", "A1-1").expect("add slot");
        zone.add_slot("A1", "A1-2").expect("add slot");
        zone.add_slot("A2", "A2-1").expect("add slot");
        zone
    }

    #[test]
    fn test_zone_totals_sum_over_areas() {
        let zone = zone_with_slots();
        assert_eq!(zone.total_slots(), 3);
        assert_eq!(zone.available_slots(), 3);
        assert_eq!(zone.occupied_slots(), 0);
    }

    #[test]
    fn test_zone_area_capacity_limit() {
        let mut zone = Zone::new("Z1", "Downtown", 1);
        zone.add_area("A1", 2).expect("add area");

        assert!(matches!(
            zone.add_area("A2", 2),
            Err(Error::CapacityExceeded(_))
        ));
    }

    #[test]
    fn test_zone_duplicate_area_id() {
        let mut zone = Zone::new("Z1", "Downtown", 4);
        zone.add_area("A1", 2).expect("add area");

        assert!(matches!(
            zone.add_area("A1", 2),
            Err(Error::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn test_zone_wide_slot_uniqueness() {
        let mut zone = zone_with_slots();
        // Same slot ID in a different area is still rejected
        let err = zone.add_slot("A2", "A1-1").unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier(_)));
    }

    #[test]
    fn test_first_available_scans_areas_in_order() {
        let mut zone = zone_with_slots();
        assert_eq!(zone.first_available().map(|s| s.id()), Some("A1-1"));

        zone.find_slot_mut("A1-1")
            .expect("slot exists")
            .occupy("V1")
            .expect("occupy");
        zone.find_slot_mut("A1-2")
            .expect("slot exists")
            .occupy("V2")
            .expect("occupy");

        // A1 exhausted, search falls through to A2
        assert_eq!(zone.first_available().map(|s| s.id()), Some("A2-1"));
        assert_eq!(zone.occupied_slots(), 2);
    }

    #[test]
    fn test_add_slot_unknown_area() {
        let mut zone = zone_with_slots();
        let err = zone.add_slot("A9", "A9-1").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

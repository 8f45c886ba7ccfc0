//! Parking areas, the mid level of the capacity hierarchy

use crate::error::{Error, Result};

use super::slot::ParkingSlot;

/// A subdivision of a zone holding an ordered run of slots.
///
/// Slots are kept in insertion order; that order is the allocation search
/// order and is part of the allocation contract, not an implementation
/// detail.
#[derive(Debug, Clone)]
pub struct ParkingArea {
    /// Unique ID within the owning zone
    id: String,
    /// Owning zone ID
    zone_id: String,
    slots: Vec<ParkingSlot>,
    max_slots: usize,
}

impl ParkingArea {
    /// Create an empty area with a slot capacity
    pub fn new(id: impl Into<String>, zone_id: impl Into<String>, max_slots: usize) -> Self {
        Self {
            id: id.into(),
            zone_id: zone_id.into(),
            slots: Vec::new(),
            max_slots,
        }
    }

    /// Area identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the zone this area belongs to
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Maximum number of slots this area accepts
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Add a slot at the end of the search order.
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExceeded` when the area is full and
    /// `Error::DuplicateIdentifier` when the slot ID is already present.
    pub fn add_slot(&mut self, slot_id: &str) -> Result<()> {
        if self.slots.len() >= self.max_slots {
            return Err(Error::CapacityExceeded(format!(
                "Area {} is full ({} slots)",
                self.id, self.max_slots
            )));
        }
        if self.slot(slot_id).is_some() {
            return Err(Error::DuplicateIdentifier(format!(
                "Slot {} already exists in area {}",
                slot_id, self.id
            )));
        }
        self.slots
            .push(ParkingSlot::new(slot_id, self.zone_id.clone()));
        Ok(())
    }

    /// Slots in insertion order
    pub fn slots(&self) -> &[ParkingSlot] {
        &self.slots
    }

    /// Look up a slot by ID
    pub fn slot(&self, slot_id: &str) -> Option<&ParkingSlot> {
        self.slots.iter().find(|s| s.id() == slot_id)
    }

    /// Look up a slot by ID for mutation
    pub fn slot_mut(&mut self, slot_id: &str) -> Option<&mut ParkingSlot> {
        self.slots.iter_mut().find(|s| s.id() == slot_id)
    }

    /// First free slot in insertion order, if any
    pub fn first_available(&self) -> Option<&ParkingSlot> {
        self.slots.iter().find(|s| s.is_available())
    }

    /// Number of slots in this area
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of free slots in this area
    pub fn available_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_available()).count()
    }
}

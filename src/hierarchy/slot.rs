//! Slot management for the capacity hierarchy

use std::fmt;

use crate::error::{Error, Result};

/// A single parkable unit, the atomic allocatable resource.
///
/// A slot is created empty and available. It is mutated only by allocation
/// (available → occupied) and by release, cancel or rollback
/// (occupied → available). The occupying vehicle and the availability flag
/// are one field: a slot is available exactly when no vehicle holds it.
#[derive(Debug, Clone)]
pub struct ParkingSlot {
    /// Unique ID within the owning zone
    id: String,
    /// Owning zone ID, denormalized for fast lookup
    zone_id: String,
    /// Occupying vehicle, `None` when the slot is free
    vehicle: Option<String>,
}

impl ParkingSlot {
    /// Create a new free slot
    pub fn new(id: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            zone_id: zone_id.into(),
            vehicle: None,
        }
    }

    /// Slot identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the zone this slot belongs to
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Whether the slot is free
    pub fn is_available(&self) -> bool {
        self.vehicle.is_none()
    }

    /// Identifier of the occupying vehicle, if any
    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle.as_deref()
    }

    /// Occupy this slot for a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` if the slot is already occupied.
    pub fn occupy(&mut self, vehicle_id: &str) -> Result<()> {
        if let Some(current) = &self.vehicle {
            return Err(Error::InvalidState(format!(
                "Slot {} is already occupied by vehicle {}",
                self.id, current
            )));
        }
        self.vehicle = Some(vehicle_id.to_string());
        Ok(())
    }

    /// Free this slot, clearing the occupying vehicle.
    ///
    /// Vacating an already free slot is a no-op; rollback relies on that.
    pub fn vacate(&mut self) {
        self.vehicle = None;
    }
}

impl fmt::Display for ParkingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vehicle {
            Some(v) => write!(f, "Slot({}, zone={}, vehicle={})", self.id, self.zone_id, v),
            None => write!(f, "Slot({}, zone={}, free)", self.id, self.zone_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_available() {
        let slot = ParkingSlot::new("A1-1", "Z1");
        assert!(slot.is_available());
        assert_eq!(slot.vehicle_id(), None);
        assert_eq!(slot.zone_id(), "Z1");
    }

    #[test]
    fn test_slot_occupy_and_vacate() {
        let mut slot = ParkingSlot::new("A1-1", "Z1");

        slot.occupy("V1000").expect("first occupy succeeds");
        assert!(!slot.is_available());
        assert_eq!(slot.vehicle_id(), Some("V1000"));

        slot.vacate();
        assert!(slot.is_available());
        assert_eq!(slot.vehicle_id(), None);
    }

    #[test]
    fn test_slot_double_occupy_fails() {
        let mut slot = ParkingSlot::new("A1-1", "Z1");
        slot.occupy("V1000").expect("first occupy succeeds");

        let err = slot.occupy("V1001").unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        // The original occupant is untouched
        assert_eq!(slot.vehicle_id(), Some("V1000"));
    }

    #[test]
    fn test_vacate_free_slot_is_noop() {
        let mut slot = ParkingSlot::new("A1-1", "Z1");
        slot.vacate();
        assert!(slot.is_available());
    }
}

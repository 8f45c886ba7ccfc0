//! Capacity hierarchy
//!
//! # Architecture
//!
//! Parking capacity is organized in a three-level owning tree:
//!
//! ```text
//! Zones (ID → Zone, insertion-ordered)
//!   └─→ Areas (ID → ParkingArea, insertion-ordered)
//!        └─→ Slots (ID → ParkingSlot, insertion-ordered)
//! ```
//!
//! Every level is keyed by a caller-supplied string identifier and preserves
//! insertion order. Order matters: the allocation search scans zones, areas
//! and slots in the order they were added, so the first free slot a vehicle
//! receives is deterministic.
//!
//! The tree is the single owner of all capacity entities. Every other part
//! of the system (requests, the undo log, the queue) refers to zones and
//! slots by identifier and re-resolves them here when it needs the actual
//! object.

pub mod area;
pub mod slot;
pub mod zone;

pub use area::ParkingArea;
pub use slot::ParkingSlot;
pub use zone::Zone;

use tracing::debug;

use crate::error::{Error, Result};

/// The owning collection of zones, and the entry point for capacity setup.
///
/// # Examples
///
/// ```rust
/// use parkeon::hierarchy::CapacityHierarchy;
///
/// # fn main() -> parkeon::error::Result<()> {
/// let mut hierarchy = CapacityHierarchy::new(10);
/// hierarchy.add_zone("Z1", "Downtown", 4)?;
/// hierarchy.add_area("Z1", "A1", 8)?;
/// hierarchy.add_slot("Z1", "A1", "A1-1")?;
///
/// assert_eq!(hierarchy.total_slots(), 1);
/// assert_eq!(hierarchy.available_slots(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CapacityHierarchy {
    zones: Vec<Zone>,
    max_zones: usize,
}

impl CapacityHierarchy {
    /// Create an empty hierarchy with a zone capacity
    pub fn new(max_zones: usize) -> Self {
        Self {
            zones: Vec::new(),
            max_zones,
        }
    }

    /// Register a new zone at the end of the search order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a malformed identifier,
    /// `Error::DuplicateIdentifier` if the zone ID is taken and
    /// `Error::CapacityExceeded` when the zone table is full.
    pub fn add_zone(&mut self, zone_id: &str, name: &str, max_areas: usize) -> Result<()> {
        validate_identifier(zone_id)?;
        if self.zones.len() >= self.max_zones {
            return Err(Error::CapacityExceeded(format!(
                "Zone table is full ({} zones)",
                self.max_zones
            )));
        }
        if self.zone(zone_id).is_some() {
            return Err(Error::DuplicateIdentifier(format!(
                "Zone {} already exists",
                zone_id
            )));
        }
        self.zones.push(Zone::new(zone_id, name, max_areas));
        debug!(zone = %zone_id, name = %name, "Zone added");
        Ok(())
    }

    /// Add an area to a zone.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown zone, plus the area-level
    /// capacity and duplicate failures of [`Zone::add_area`].
    pub fn add_area(&mut self, zone_id: &str, area_id: &str, max_slots: usize) -> Result<()> {
        validate_identifier(area_id)?;
        let zone = self
            .zone_mut(zone_id)
            .ok_or_else(|| Error::NotFound(format!("Zone {} not found", zone_id)))?;
        zone.add_area(area_id, max_slots)?;
        debug!(zone = %zone_id, area = %area_id, max_slots, "Area added");
        Ok(())
    }

    /// Add a slot to an area of a zone.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown zone or area, plus the
    /// slot-level failures of [`Zone::add_slot`].
    pub fn add_slot(&mut self, zone_id: &str, area_id: &str, slot_id: &str) -> Result<()> {
        validate_identifier(slot_id)?;
        let zone = self
            .zone_mut(zone_id)
            .ok_or_else(|| Error::NotFound(format!("Zone {} not found", zone_id)))?;
        zone.add_slot(area_id, slot_id)?;
        debug!(zone = %zone_id, area = %area_id, slot = %slot_id, "Slot added");
        Ok(())
    }

    /// Zones in insertion order
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of zones
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Look up a zone by ID
    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id() == zone_id)
    }

    /// Look up a zone by ID for mutation
    pub fn zone_mut(&mut self, zone_id: &str) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id() == zone_id)
    }

    /// Position of a zone in the insertion order, used by the circular
    /// cross-zone search
    pub fn zone_index(&self, zone_id: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.id() == zone_id)
    }

    /// Look up a slot by (zone, slot) identifier pair
    pub fn slot(&self, zone_id: &str, slot_id: &str) -> Option<&ParkingSlot> {
        self.zone(zone_id)?.find_slot(slot_id)
    }

    /// Look up a slot by (zone, slot) identifier pair for mutation
    pub fn slot_mut(&mut self, zone_id: &str, slot_id: &str) -> Option<&mut ParkingSlot> {
        self.zone_mut(zone_id)?.find_slot_mut(slot_id)
    }

    /// Total slots across all zones
    pub fn total_slots(&self) -> usize {
        self.zones.iter().map(|z| z.total_slots()).sum()
    }

    /// Free slots across all zones
    pub fn available_slots(&self) -> usize {
        self.zones.iter().map(|z| z.available_slots()).sum()
    }

    /// Occupied slots across all zones
    pub fn occupied_slots(&self) -> usize {
        self.total_slots() - self.available_slots()
    }
}

/// Validates an identifier for zones, areas, slots, vehicles and requests.
///
/// Rules:
/// - Must not be empty
/// - Maximum 64 characters
/// - Must start with a letter or underscore
/// - Can contain letters, numbers, underscores and hyphens
///
/// # Examples
///
/// ```rust
/// use parkeon::hierarchy::validate_identifier;
///
/// assert!(validate_identifier("Z1").is_ok());
/// assert!(validate_identifier("A1-1").is_ok());
/// assert!(validate_identifier("").is_err());
/// assert!(validate_identifier("1Z").is_err());
/// assert!(validate_identifier("Z 1").is_err());
/// ```
pub fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidArgument(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if id.len() > 64 {
        return Err(Error::InvalidArgument(
            "Identifier cannot be longer than 64 characters".to_string(),
        ));
    }

    // Must start with letter or underscore
    if !id.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err(Error::InvalidArgument(
            "Identifier must start with a letter or underscore".to_string(),
        ));
    }

    // Must contain only alphanumeric characters, underscores and hyphens
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::InvalidArgument(
            "Identifier can only contain letters, numbers, underscores and hyphens".to_string(),
        ));
    }

    Ok(())
}

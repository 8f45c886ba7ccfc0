//! Vehicle registry
//!
//! Bounded, insertion-ordered table of registered vehicles. Lookup is by
//! vehicle id; license plates are optional but unique when present.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::hierarchy::validate_identifier;

/// A registered vehicle
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: String,
    vehicle_type: String,
    preferred_zone: String,
    license_plate: Option<String>,
    owner_name: Option<String>,
    registered_at: DateTime<Utc>,
}

impl Vehicle {
    /// Create a vehicle with no plate or owner on record
    pub fn new(
        id: impl Into<String>,
        vehicle_type: impl Into<String>,
        preferred_zone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_type: vehicle_type.into(),
            preferred_zone: preferred_zone.into(),
            license_plate: None,
            owner_name: None,
            registered_at: Utc::now(),
        }
    }

    /// Create a vehicle with full registration details
    pub fn with_details(
        id: impl Into<String>,
        vehicle_type: impl Into<String>,
        preferred_zone: impl Into<String>,
        license_plate: Option<String>,
        owner_name: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_type: vehicle_type.into(),
            preferred_zone: preferred_zone.into(),
            license_plate,
            owner_name,
            registered_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vehicle_type(&self) -> &str {
        &self.vehicle_type
    }

    pub fn preferred_zone(&self) -> &str {
        &self.preferred_zone
    }

    pub fn license_plate(&self) -> Option<&str> {
        self.license_plate.as_deref()
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vehicle({}, {}, zone={})",
            self.id, self.vehicle_type, self.preferred_zone
        )
    }
}

/// License plates are four ASCII digits when supplied.
fn validate_plate(plate: &str) -> Result<()> {
    if plate.len() != 4 || !plate.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidArgument(format!(
            "License plate must be exactly four digits: '{}'",
            plate
        )));
    }
    Ok(())
}

/// Bounded vehicle table, enumerated in registration order.
#[derive(Debug, Clone)]
pub struct VehicleRegistry {
    vehicles: Vec<Vehicle>,
    max_vehicles: usize,
}

impl VehicleRegistry {
    pub fn new(max_vehicles: usize) -> Self {
        Self {
            vehicles: Vec::new(),
            max_vehicles,
        }
    }

    /// Register a vehicle.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a malformed id or license
    /// plate, `Error::CapacityExceeded` when the table is full, and
    /// `Error::DuplicateIdentifier` when the id or plate is already
    /// registered.
    pub fn register(&mut self, vehicle: Vehicle) -> Result<()> {
        validate_identifier(vehicle.id())?;
        if let Some(plate) = vehicle.license_plate() {
            validate_plate(plate)?;
        }
        if self.vehicles.len() >= self.max_vehicles {
            return Err(Error::CapacityExceeded(format!(
                "Vehicle table is full ({} vehicles)",
                self.max_vehicles
            )));
        }
        if self.contains(vehicle.id()) {
            return Err(Error::DuplicateIdentifier(format!(
                "Vehicle {} is already registered",
                vehicle.id()
            )));
        }
        if let Some(plate) = vehicle.license_plate() {
            if self
                .vehicles
                .iter()
                .any(|v| v.license_plate() == Some(plate))
            {
                return Err(Error::DuplicateIdentifier(format!(
                    "License plate {} is already registered",
                    plate
                )));
            }
        }

        debug!(vehicle = %vehicle.id(), kind = %vehicle.vehicle_type(), "Vehicle registered");
        self.vehicles.push(vehicle);
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Vehicles in registration order
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_vehicles
    }
}

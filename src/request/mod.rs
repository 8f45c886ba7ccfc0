//! Parking request lifecycle
//!
//! # State machine
//!
//! ```text
//! REQUESTED ──▶ ALLOCATED ──▶ OCCUPIED ──▶ RELEASED (terminal)
//!     │             │
//!     └─────────────┴──▶ CANCELLED (terminal)
//! ```
//!
//! Every transition is guarded: an illegal call fails with
//! `Error::InvalidState` and leaves both the request and any bound slot
//! untouched. Transitions that touch a slot (allocate, release, cancel of
//! an allocated request) take the resolved slot as an argument, so the
//! slot mutation and the state change happen together or not at all.
//!
//! A request never owns its slot. Once allocated it holds a [`SlotRef`],
//! a (zone, slot) identifier pair that callers re-resolve through the
//! capacity hierarchy.

pub mod directory;
pub mod queue;

pub use directory::RequestDirectory;
pub use queue::RequestQueue;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hierarchy::ParkingSlot;

/// Lifecycle state of a parking request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Requested,
    Allocated,
    Occupied,
    Released,
    Cancelled,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestState::Requested => "REQUESTED",
            RequestState::Allocated => "ALLOCATED",
            RequestState::Occupied => "OCCUPIED",
            RequestState::Released => "RELEASED",
            RequestState::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RequestState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "REQUESTED" => Ok(RequestState::Requested),
            "ALLOCATED" => Ok(RequestState::Allocated),
            "OCCUPIED" => Ok(RequestState::Occupied),
            "RELEASED" => Ok(RequestState::Released),
            "CANCELLED" => Ok(RequestState::Cancelled),
            other => Err(Error::InvalidArgument(format!(
                "Unknown request state: {}",
                other
            ))),
        }
    }
}

/// Non-owning reference to a slot, as a (zone, slot) identifier pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRef {
    pub zone_id: String,
    pub slot_id: String,
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone_id, self.slot_id)
    }
}

/// A vehicle's intent to park, tracked through the lifecycle state machine.
#[derive(Debug, Clone)]
pub struct ParkingRequest {
    id: String,
    vehicle_id: String,
    /// Zone the vehicle asked for, not necessarily where it parked
    zone_id: String,
    state: RequestState,
    /// Bound once allocated; kept afterwards for reporting
    slot: Option<SlotRef>,
    cross_zone: bool,
    request_time: DateTime<Utc>,
    allocation_time: Option<DateTime<Utc>>,
    release_time: Option<DateTime<Utc>>,
}

impl ParkingRequest {
    /// Create a new request in `REQUESTED` state
    pub fn new(
        id: impl Into<String>,
        vehicle_id: impl Into<String>,
        zone_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_id: vehicle_id.into(),
            zone_id: zone_id.into(),
            state: RequestState::Requested,
            slot: None,
            cross_zone: false,
            request_time: Utc::now(),
            allocation_time: None,
            release_time: None,
        }
    }

    /// Request identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the requesting vehicle
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Identifier of the requested zone
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Current lifecycle state
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// The bound slot, if the request ever reached `ALLOCATED`
    pub fn slot_ref(&self) -> Option<&SlotRef> {
        self.slot.as_ref()
    }

    /// True when the bound slot lies outside the requested zone
    pub fn is_cross_zone(&self) -> bool {
        self.cross_zone
    }

    /// When the request was created
    pub fn request_time(&self) -> DateTime<Utc> {
        self.request_time
    }

    /// When the slot was allocated, if it was
    pub fn allocation_time(&self) -> Option<DateTime<Utc>> {
        self.allocation_time
    }

    /// When the slot was released, if it was
    pub fn release_time(&self) -> Option<DateTime<Utc>> {
        self.release_time
    }

    /// True for `REQUESTED`, `ALLOCATED` and `OCCUPIED`
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            RequestState::Requested | RequestState::Allocated | RequestState::Occupied
        )
    }

    /// Bind a slot and move to `ALLOCATED`.
    ///
    /// Occupies the slot for this request's vehicle, records the
    /// allocation timestamp and the cross-zone flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` if the request is not in `REQUESTED`
    /// state or the slot is already occupied; the request is left
    /// unchanged either way.
    pub fn allocate(&mut self, slot: &mut ParkingSlot, cross_zone: bool) -> Result<()> {
        if self.state != RequestState::Requested {
            return Err(Error::InvalidState(format!(
                "Request {} cannot be allocated from state {}",
                self.id, self.state
            )));
        }
        // Fails if the slot is taken, before any request mutation
        slot.occupy(&self.vehicle_id)?;

        self.slot = Some(SlotRef {
            zone_id: slot.zone_id().to_string(),
            slot_id: slot.id().to_string(),
        });
        self.cross_zone = cross_zone;
        self.allocation_time = Some(Utc::now());
        self.state = RequestState::Allocated;
        Ok(())
    }

    /// Move from `ALLOCATED` to `OCCUPIED`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` from any other state.
    pub fn mark_occupied(&mut self) -> Result<()> {
        if self.state != RequestState::Allocated {
            return Err(Error::InvalidState(format!(
                "Request {} cannot be occupied from state {}",
                self.id, self.state
            )));
        }
        self.state = RequestState::Occupied;
        Ok(())
    }

    /// Free the bound slot and move from `OCCUPIED` to `RELEASED`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` from any other state and
    /// `Error::InvalidArgument` if the passed slot is not the bound one.
    pub fn mark_released(&mut self, slot: &mut ParkingSlot) -> Result<()> {
        if self.state != RequestState::Occupied {
            return Err(Error::InvalidState(format!(
                "Request {} cannot be released from state {}",
                self.id, self.state
            )));
        }
        self.check_bound(slot)?;

        slot.vacate();
        self.release_time = Some(Utc::now());
        self.state = RequestState::Released;
        Ok(())
    }

    /// Move to `CANCELLED` from `REQUESTED` or `ALLOCATED`.
    ///
    /// An allocated request frees its slot exactly as a release would; pass
    /// the resolved slot in that case and `None` before allocation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` from `OCCUPIED`, `RELEASED` or
    /// `CANCELLED`, `Error::NotFound` if an allocated request is cancelled
    /// without its slot, and `Error::InvalidArgument` on a slot mismatch.
    pub fn cancel(&mut self, slot: Option<&mut ParkingSlot>) -> Result<()> {
        match self.state {
            RequestState::Requested => {
                self.state = RequestState::Cancelled;
                Ok(())
            }
            RequestState::Allocated => {
                let slot = slot.ok_or_else(|| {
                    Error::NotFound(format!(
                        "Request {} holds a slot that could not be resolved",
                        self.id
                    ))
                })?;
                self.check_bound(slot)?;

                slot.vacate();
                self.state = RequestState::Cancelled;
                Ok(())
            }
            _ => Err(Error::InvalidState(format!(
                "Request {} cannot be cancelled from state {}",
                self.id, self.state
            ))),
        }
    }

    /// Time parked, in minutes.
    ///
    /// Defined only for `RELEASED` requests: release time minus allocation
    /// time, falling back to the request time when the request was somehow
    /// released without an allocation timestamp. Zero in every other state.
    pub fn duration_minutes(&self) -> f64 {
        match (self.state, self.release_time) {
            (RequestState::Released, Some(released)) => {
                let from = self.allocation_time.unwrap_or(self.request_time);
                (released - from).num_milliseconds() as f64 / 60_000.0
            }
            _ => 0.0,
        }
    }

    /// Corrective state rewind for the undo subsystem; skips the
    /// transition guards on purpose.
    pub(crate) fn force_state(&mut self, state: RequestState) {
        self.state = state;
    }

    fn check_bound(&self, slot: &ParkingSlot) -> Result<()> {
        match &self.slot {
            Some(bound) if bound.slot_id == slot.id() && bound.zone_id == slot.zone_id() => Ok(()),
            Some(bound) => Err(Error::InvalidArgument(format!(
                "Request {} is bound to slot {}, not {}/{}",
                self.id,
                bound,
                slot.zone_id(),
                slot.id()
            ))),
            None => Err(Error::InvalidState(format!(
                "Request {} has no bound slot",
                self.id
            ))),
        }
    }
}

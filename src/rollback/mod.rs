//! Rollback log
//!
//! A bounded history of the state-mutating operations (allocation,
//! cancellation, state change), consumed most-recent-first. Recording
//! never fails: pushing past capacity silently evicts the single oldest
//! record, so the log is a bounded deque even though it is popped like a
//! stack. The backing store is a `VecDeque`, giving O(1) eviction at the
//! old end and O(1) push/pop at the new end.
//!
//! Records hold identifiers only and re-resolve the request and slot
//! through the directory and the hierarchy at undo time, because both may
//! have changed state since the record was pushed. A popped record is
//! consumed whether or not its undo succeeds; failed undos are reported,
//! never retried.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::hierarchy::CapacityHierarchy;
use crate::request::{RequestDirectory, RequestState, SlotRef};

/// Discriminant of a rollback record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackKind {
    Allocation,
    Cancellation,
    StateChange,
}

impl fmt::Display for RollbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RollbackKind::Allocation => "ALLOCATION",
            RollbackKind::Cancellation => "CANCELLATION",
            RollbackKind::StateChange => "STATE_CHANGE",
        };
        write!(f, "{}", s)
    }
}

/// Kind-specific payload, carrying enough data to reverse the operation
#[derive(Debug, Clone)]
pub enum RollbackAction {
    /// A slot was allocated to the request
    Allocation { slot: SlotRef },
    /// The request was cancelled; captured at cancel time so the undo can
    /// restore the exact prior state and re-occupy the freed slot
    Cancellation {
        previous_state: RequestState,
        freed_slot: Option<SlotRef>,
    },
    /// A guarded forward transition moved the request out of
    /// `previous_state`
    StateChange { previous_state: RequestState },
}

/// One reversible operation against a single request
#[derive(Debug, Clone)]
pub struct RollbackOperation {
    request_id: String,
    action: RollbackAction,
    recorded_at: DateTime<Utc>,
}

impl RollbackOperation {
    /// Identifier of the request the operation targets
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The reversal payload
    pub fn action(&self) -> &RollbackAction {
        &self.action
    }

    /// When the forward operation was recorded
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Discriminant of the payload
    pub fn kind(&self) -> RollbackKind {
        match self.action {
            RollbackAction::Allocation { .. } => RollbackKind::Allocation,
            RollbackAction::Cancellation { .. } => RollbackKind::Cancellation,
            RollbackAction::StateChange { .. } => RollbackKind::StateChange,
        }
    }
}

/// Bounded undo history with most-recent-first consumption.
#[derive(Debug, Clone)]
pub struct RollbackLog {
    operations: VecDeque<RollbackOperation>,
    max_operations: usize,
}

impl RollbackLog {
    /// Create an empty log holding at most `max_operations` records
    pub fn new(max_operations: usize) -> Self {
        Self {
            operations: VecDeque::with_capacity(max_operations),
            max_operations,
        }
    }

    /// Record a successful allocation
    pub fn record_allocation(&mut self, request_id: &str, slot: SlotRef) {
        debug!(request = %request_id, slot = %slot, "Recorded allocation");
        self.push(RollbackOperation {
            request_id: request_id.to_string(),
            action: RollbackAction::Allocation { slot },
            recorded_at: Utc::now(),
        });
    }

    /// Record a successful cancellation with its prior state and, when the
    /// request was allocated, the slot the cancellation freed
    pub fn record_cancellation(
        &mut self,
        request_id: &str,
        previous_state: RequestState,
        freed_slot: Option<SlotRef>,
    ) {
        debug!(request = %request_id, previous = %previous_state, "Recorded cancellation");
        self.push(RollbackOperation {
            request_id: request_id.to_string(),
            action: RollbackAction::Cancellation {
                previous_state,
                freed_slot,
            },
            recorded_at: Utc::now(),
        });
    }

    /// Record a successful guarded transition out of `previous_state`
    pub fn record_state_change(&mut self, request_id: &str, previous_state: RequestState) {
        debug!(request = %request_id, previous = %previous_state, "Recorded state change");
        self.push(RollbackOperation {
            request_id: request_id.to_string(),
            action: RollbackAction::StateChange { previous_state },
            recorded_at: Utc::now(),
        });
    }

    fn push(&mut self, operation: RollbackOperation) {
        if self.operations.len() >= self.max_operations {
            // Evict the oldest record to keep the bound
            self.operations.pop_front();
        }
        self.operations.push_back(operation);
    }

    /// Number of records available for rollback
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True when no records are available
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Maximum number of records kept
    pub fn capacity(&self) -> usize {
        self.max_operations
    }

    /// Records most-recent-first, for reporting
    pub fn iter(&self) -> impl Iterator<Item = &RollbackOperation> {
        self.operations.iter().rev()
    }

    /// Pop the most recent record and replay its inverse.
    ///
    /// The record is consumed even when the undo fails; a rollback is
    /// attempted at most once.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the log is empty, when the target
    /// request is no longer in the directory, or when a recorded slot no
    /// longer resolves; `Error::InvalidState` when a cancellation undo
    /// finds its slot re-occupied.
    pub fn rollback_last(
        &mut self,
        directory: &mut RequestDirectory,
        hierarchy: &mut CapacityHierarchy,
    ) -> Result<()> {
        let operation = self
            .operations
            .pop_back()
            .ok_or_else(|| Error::NotFound("No operations to roll back".to_string()))?;

        let result = undo(&operation, directory, hierarchy);
        match &result {
            Ok(()) => {
                info!(
                    request = %operation.request_id,
                    kind = %operation.kind(),
                    "Rolled back operation"
                );
            }
            Err(e) => {
                warn!(
                    request = %operation.request_id,
                    kind = %operation.kind(),
                    error = %e,
                    "Rollback failed, record consumed"
                );
            }
        }
        result
    }

    /// Roll back the last `k` operations.
    ///
    /// `k` is clamped to the number of available records. Every clamped
    /// step runs even if an earlier one fails, consuming its record; the
    /// first failure is reported after the loop completes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for `k == 0`, otherwise the first
    /// per-step failure, if any.
    pub fn rollback_last_k(
        &mut self,
        k: usize,
        directory: &mut RequestDirectory,
        hierarchy: &mut CapacityHierarchy,
    ) -> Result<()> {
        if k == 0 {
            return Err(Error::InvalidArgument(
                "Rollback count must be positive".to_string(),
            ));
        }

        let count = k.min(self.operations.len());
        info!(requested = k, rolling_back = count, "Rolling back operations");

        let mut first_error = None;
        for _ in 0..count {
            if let Err(e) = self.rollback_last(directory, hierarchy) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Replay the inverse of one recorded operation.
fn undo(
    operation: &RollbackOperation,
    directory: &mut RequestDirectory,
    hierarchy: &mut CapacityHierarchy,
) -> Result<()> {
    let request = directory.find_mut(&operation.request_id).ok_or_else(|| {
        Error::NotFound(format!(
            "Request {} not found for rollback",
            operation.request_id
        ))
    })?;

    match &operation.action {
        RollbackAction::Allocation { slot } => {
            // Hard revert: free the slot and cancel the request no matter
            // what state it has reached since
            let resolved = hierarchy.slot_mut(&slot.zone_id, &slot.slot_id).ok_or_else(|| {
                Error::NotFound(format!(
                    "Slot {} not found in zone {}",
                    slot.slot_id, slot.zone_id
                ))
            })?;
            resolved.vacate();
            request.force_state(RequestState::Cancelled);
            Ok(())
        }
        RollbackAction::Cancellation {
            previous_state,
            freed_slot,
        } => {
            if let Some(slot_ref) = freed_slot {
                let vehicle_id = request.vehicle_id().to_string();
                let resolved = hierarchy
                    .slot_mut(&slot_ref.zone_id, &slot_ref.slot_id)
                    .ok_or_else(|| {
                        Error::NotFound(format!(
                            "Slot {} not found in zone {}",
                            slot_ref.slot_id, slot_ref.zone_id
                        ))
                    })?;
                // Fails if the slot was re-allocated since the cancellation;
                // the request is left untouched in that case
                resolved.occupy(&vehicle_id)?;
            }
            request.force_state(*previous_state);
            Ok(())
        }
        RollbackAction::StateChange { previous_state } => {
            // Corrective rewind of the state only; timestamps and slot
            // bindings keep their forward-operation values
            request.force_state(*previous_state);
            Ok(())
        }
    }
}

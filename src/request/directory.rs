//! Request directory

use tracing::debug;

use crate::error::{Error, Result};

use super::{ParkingRequest, RequestState};

/// Insertion-ordered collection of every request the system has seen,
/// keyed by request identifier.
///
/// The directory is the single owner of request values for their whole
/// life; every other component refers to requests by identifier.
/// Enumeration order is insertion order, which reporting collaborators
/// rely on.
#[derive(Debug, Clone, Default)]
pub struct RequestDirectory {
    requests: Vec<ParkingRequest>,
}

impl RequestDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// File a request under its identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateIdentifier` if a request with the same
    /// identifier was already filed.
    pub fn add(&mut self, request: ParkingRequest) -> Result<()> {
        if self.find(request.id()).is_some() {
            return Err(Error::DuplicateIdentifier(format!(
                "Request {} already exists",
                request.id()
            )));
        }
        debug!(request = %request.id(), "Request filed");
        self.requests.push(request);
        Ok(())
    }

    /// Look up a request by identifier
    pub fn find(&self, request_id: &str) -> Option<&ParkingRequest> {
        self.requests.iter().find(|r| r.id() == request_id)
    }

    /// Look up a request by identifier for mutation
    pub fn find_mut(&mut self, request_id: &str) -> Option<&mut ParkingRequest> {
        self.requests.iter_mut().find(|r| r.id() == request_id)
    }

    /// Remove a request by identifier, returning it if present
    pub fn remove(&mut self, request_id: &str) -> Option<ParkingRequest> {
        let index = self.requests.iter().position(|r| r.id() == request_id)?;
        Some(self.requests.remove(index))
    }

    /// All requests in insertion order
    pub fn requests(&self) -> &[ParkingRequest] {
        &self.requests
    }

    /// Number of requests ever filed and still held
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// True when no requests are held
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Number of requests currently in a given state
    pub fn count_by_state(&self, state: RequestState) -> usize {
        self.requests.iter().filter(|r| r.state() == state).count()
    }

    /// Number of requests that parked outside their requested zone
    pub fn cross_zone_count(&self) -> usize {
        self.requests.iter().filter(|r| r.is_cross_zone()).count()
    }

    /// Mean parked duration in minutes over all `RELEASED` requests,
    /// zero when none have completed
    pub fn average_completed_duration(&self) -> f64 {
        let completed: Vec<f64> = self
            .requests
            .iter()
            .filter(|r| r.state() == RequestState::Released)
            .map(|r| r.duration_minutes())
            .collect();
        if completed.is_empty() {
            return 0.0;
        }
        completed.iter().sum::<f64>() / completed.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with(ids: &[&str]) -> RequestDirectory {
        let mut dir = RequestDirectory::new();
        for id in ids {
            dir.add(ParkingRequest::new(*id, "V1000", "Z1"))
                .expect("add request");
        }
        dir
    }

    #[test]
    fn test_add_and_find() {
        let dir = directory_with(&["R1000", "R1001"]);
        assert_eq!(dir.len(), 2);
        assert!(dir.find("R1000").is_some());
        assert!(dir.find("R9999").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut dir = directory_with(&["R1000"]);
        let err = dir
            .add(ParkingRequest::new("R1000", "V1001", "Z2"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier(_)));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut dir = directory_with(&["R1000", "R1001", "R1002"]);
        let removed = dir.remove("R1001").expect("removed");
        assert_eq!(removed.id(), "R1001");
        assert_eq!(dir.len(), 2);
        assert!(dir.remove("R1001").is_none());
    }

    #[test]
    fn test_enumeration_preserves_insertion_order() {
        let dir = directory_with(&["R1002", "R1000", "R1001"]);
        let ids: Vec<&str> = dir.requests().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["R1002", "R1000", "R1001"]);
    }

    #[test]
    fn test_count_by_state() {
        let mut dir = directory_with(&["R1000", "R1001", "R1002"]);
        dir.find_mut("R1001")
            .expect("request exists")
            .cancel(None)
            .expect("cancel");

        assert_eq!(dir.count_by_state(RequestState::Requested), 2);
        assert_eq!(dir.count_by_state(RequestState::Cancelled), 1);
        assert_eq!(dir.count_by_state(RequestState::Released), 0);
    }

    #[test]
    fn test_average_duration_zero_without_completions() {
        let dir = directory_with(&["R1000", "R1001"]);
        assert_eq!(dir.average_completed_duration(), 0.0);
    }

    #[test]
    fn test_average_duration_over_released() {
        use crate::hierarchy::ParkingSlot;

        let mut dir = directory_with(&["R1000", "R1001"]);
        let mut slot = ParkingSlot::new("A1-1", "Z1");

        let req = dir.find_mut("R1000").expect("request exists");
        req.allocate(&mut slot, false).expect("allocate");
        req.mark_occupied().expect("occupy");
        req.mark_released(&mut slot).expect("release");

        // One completed request, so the mean is its own duration
        let avg = dir.average_completed_duration();
        let own = dir.find("R1000").expect("request").duration_minutes();
        assert!(avg >= 0.0);
        assert_eq!(avg, own);
    }
}

//! Sequential id generation for vehicles and requests.

/// Monotonic id source owned by the facade.
///
/// Vehicle ids are `V<n>` and request ids are `R<n>`, with both counters
/// starting at 1000. Ids are unique within one system instance; a counter
/// advances even when the operation that asked for the id later fails.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_vehicle: u64,
    next_request: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next_vehicle: 1000,
            next_request: 1000,
        }
    }

    pub fn next_vehicle_id(&mut self) -> String {
        let id = format!("V{}", self.next_vehicle);
        self.next_vehicle += 1;
        id
    }

    pub fn next_request_id(&mut self) -> String {
        let id = format!("R{}", self.next_request);
        self.next_request += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_1000() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_vehicle_id(), "V1000");
        assert_eq!(ids.next_vehicle_id(), "V1001");
        assert_eq!(ids.next_request_id(), "R1000");
    }

    #[test]
    fn test_counters_are_independent() {
        let mut ids = IdGenerator::new();
        ids.next_request_id();
        ids.next_request_id();
        assert_eq!(ids.next_vehicle_id(), "V1000");
        assert_eq!(ids.next_request_id(), "R1002");
    }
}

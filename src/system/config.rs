//! System configuration

use serde::{Deserialize, Serialize};

/// Capacity bounds and policy knobs for one system instance.
///
/// Every field has a default, so a TOML `[system]` table may set any
/// subset of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Maximum number of zones in the hierarchy
    pub max_zones: usize,
    /// Maximum number of queued, not yet processed requests
    pub queue_capacity: usize,
    /// Maximum number of retained rollback records
    pub rollback_capacity: usize,
    /// Maximum number of registered vehicles
    pub vehicle_capacity: usize,
    /// Register unknown vehicle ids on request creation instead of
    /// rejecting the request
    pub auto_register_vehicles: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_zones: 10,
            queue_capacity: 100,
            rollback_capacity: 10,
            vehicle_capacity: 100,
            auto_register_vehicles: true,
        }
    }
}

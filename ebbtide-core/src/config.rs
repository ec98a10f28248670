//! Centralized configuration for the swarm engine.
//!
//! Tunable parameters live here rather than scattered through the
//! simulation code. Geometry and physics constants that define the model
//! itself (catalog size, segment speed, smoothing factors) are fixed
//! constants in their owning modules.

/// Configuration for a [`crate::Swarm`].
#[derive(Debug, Clone)]
pub struct SwarmConfig {
    /// Seed for the deterministic random source
    pub seed: u64,
    /// Start with autonomous population dynamics enabled
    pub demo_mode: bool,
    /// Start with seeds placed on a separate inner ring
    pub distinct_inner_circle: bool,
    /// Ticks a node must wait between granted uploads
    pub send_interval: u32,
    /// Ticks a node must wait between issued piece requests
    pub request_interval: u32,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            demo_mode: false,
            distinct_inner_circle: false,
            send_interval: 30,
            request_interval: 30,
        }
    }
}

impl SwarmConfig {
    /// Configuration for reproducible tests: fixed seed, no autonomous
    /// population changes.
    pub fn deterministic_testing() -> Self {
        Self {
            seed: 42,
            demo_mode: false,
            ..Default::default()
        }
    }
}

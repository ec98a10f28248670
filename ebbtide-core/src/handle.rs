//! Shared handle for driving a swarm while a renderer reads it.
//!
//! The engine itself is single-threaded (`&mut self`); this wrapper puts
//! it behind one coarse `parking_lot::RwLock` so an external driver can
//! tick it while renderers and tooling take copy-out snapshots. Reads
//! never hand out borrows into live state, so no reader can observe a
//! half-applied command: in particular [`SwarmHandle::clear`] empties the
//! roster and the transfer set under a single write lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::SwarmConfig;
use crate::node::NodeId;
use crate::snapshot::{NodeSnapshot, TransferSnapshot};
use crate::stats::{AvailabilityReport, SwarmStats};
use crate::swarm::Swarm;

/// Cloneable, thread-safe handle to a [`Swarm`].
#[derive(Debug, Clone)]
pub struct SwarmHandle {
    inner: Arc<RwLock<Swarm>>,
}

impl SwarmHandle {
    /// Creates a handle owning a fresh swarm.
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Swarm::new(config))),
        }
    }

    /// Advances the simulation by one tick.
    pub fn step(&self) {
        self.inner.write().step();
    }

    pub fn add_node(&self) -> NodeId {
        self.inner.write().add_node()
    }

    pub fn add_seed(&self, partial: bool) -> NodeId {
        self.inner.write().add_seed(partial)
    }

    pub fn remove_node(&self, id: Option<NodeId>) -> bool {
        self.inner.write().remove_node(id)
    }

    /// Empties the roster and transfer set atomically.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Flips demo mode, returning the new state.
    pub fn toggle_demo_mode(&self) -> bool {
        let mut swarm = self.inner.write();
        let enabled = !swarm.demo_mode();
        swarm.set_demo_mode(enabled);
        enabled
    }

    /// Flips the distinct inner circle layout, returning the new state.
    pub fn toggle_distinct_inner_circle(&self) -> bool {
        let mut swarm = self.inner.write();
        let enabled = !swarm.distinct_inner_circle();
        swarm.set_distinct_inner_circle(enabled);
        enabled
    }

    pub fn tick(&self) -> u64 {
        self.inner.read().tick()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    pub fn transfer_count(&self) -> usize {
        self.inner.read().transfer_count()
    }

    /// Copy-out view of every node.
    pub fn node_snapshots(&self) -> Vec<NodeSnapshot> {
        self.inner.read().node_snapshots()
    }

    /// Copy-out view of every in-flight transfer.
    pub fn transfer_snapshots(&self) -> Vec<TransferSnapshot> {
        self.inner.read().transfer_snapshots()
    }

    pub fn global_availability(&self) -> AvailabilityReport {
        self.inner.read().global_availability()
    }

    pub fn stats(&self) -> SwarmStats {
        self.inner.read().stats()
    }

    /// One-line human-readable statistics string.
    pub fn statistics(&self) -> String {
        self.inner.read().statistics()
    }
}

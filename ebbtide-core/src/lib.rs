//! Ebbtide Core - discrete-time peer-to-peer swarm simulation
//!
//! This crate models a simplified BitTorrent-style content-distribution
//! swarm: a set of nodes holding subsets of a fixed piece catalog, trading
//! pieces over simulated ticks with upload cooldowns, receive-side
//! congestion, and staggered multi-part transfer delivery. Swarm health is
//! summarized by availability and confidence metrics.
//!
//! The engine is synchronous and fully deterministic: all randomness flows
//! through a seedable [`rng::SimRng`], so two swarms built with the same
//! seed and command sequence replay identically. Rendering, input handling,
//! and the wall-clock timer that drives stepping are external collaborators
//! consuming the read-only snapshot types in [`snapshot`].

pub mod color;
pub mod config;
pub mod geometry;
pub mod handle;
pub mod node;
pub mod piece;
pub mod rng;
pub mod snapshot;
pub mod stats;
pub mod swarm;
pub mod transfer;

// Re-export main types for convenient access
pub use config::SwarmConfig;
pub use handle::SwarmHandle;
pub use node::{Node, NodeId};
pub use piece::{PARTS_PER_PIECE, PIECE_COUNT, PieceIndex};
pub use snapshot::{NodeSnapshot, SegmentSnapshot, TransferSnapshot};
pub use stats::{AvailabilityReport, SwarmStats};
pub use swarm::Swarm;

/// Errors that can bubble up from swarm operations.
///
/// Transient protocol outcomes (active cooldown, congestion, no available
/// supplier) are not errors; they surface as `false` returns and are
/// retried on later ticks. The only hard failures are precondition
/// violations on caller-supplied piece indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwarmError {
    #[error("piece index {index} out of range (catalog has {max} pieces)", max = PIECE_COUNT)]
    PieceIndexOutOfRange {
        /// The offending index
        index: PieceIndex,
    },
}

pub type Result<T> = std::result::Result<T, SwarmError>;

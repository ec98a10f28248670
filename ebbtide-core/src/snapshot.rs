//! Read-only copy-out views for rendering and tooling.
//!
//! Snapshots are plain owned data: a renderer takes them while the tick
//! loop runs elsewhere and never holds a borrow into live swarm state.

use serde::Serialize;

use crate::color::Rgb;
use crate::geometry::Vec2;
use crate::node::{Node, NodeId};
use crate::piece::PieceIndex;
use crate::transfer::Transfer;

/// Point-in-time view of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    /// Smoothed position in normalized space
    pub position: Vec2,
    /// Smoothed display color
    pub color: Rgb,
    /// Received-part fraction per piece, for progress bars
    pub piece_progress: Vec<f32>,
    pub completion_percent: f64,
    pub is_seed: bool,
}

impl NodeSnapshot {
    pub(crate) fn capture(node: &Node) -> Self {
        Self {
            id: node.id(),
            position: node.position(),
            color: node.color(),
            piece_progress: node.piece_progress(),
            completion_percent: node.completion_percent(),
            is_seed: node.is_seed(),
        }
    }
}

/// One released in-flight segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSnapshot {
    pub position: Vec2,
    /// Display-size factor in `[0.3, 0.6)`
    pub size: f64,
}

/// Point-in-time view of one in-flight transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferSnapshot {
    pub piece: PieceIndex,
    pub sender: NodeId,
    pub receiver: NodeId,
    /// Released segments head first; delaying segments are omitted
    pub segments: Vec<SegmentSnapshot>,
}

impl TransferSnapshot {
    pub(crate) fn capture(transfer: &Transfer) -> Self {
        Self {
            piece: transfer.piece(),
            sender: transfer.sender(),
            receiver: transfer.receiver(),
            segments: transfer
                .live_segments()
                .map(|(position, size)| SegmentSnapshot { position, size })
                .collect(),
        }
    }
}

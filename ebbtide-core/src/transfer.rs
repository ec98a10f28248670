//! In-flight piece delivery: a staggered chain of segments walking from
//! sender to receiver.
//!
//! A transfer decomposes one piece into [`crate::PARTS_PER_PIECE`]
//! segments. Each segment waits out a short start delay, is released at
//! the sender's position at that moment, then walks a fixed distance per
//! tick toward the live receiver position. Near the receiver it must pass
//! the congestion gate before entering; a rejected segment wanders toward
//! a random point for a tick instead of arriving. The chain is stored as
//! an array with an advancing head index rather than a linked structure;
//! only the head segment's arrival retires a part, and the receiver is
//! credited with the whole piece once the chain empties.

use tracing::trace;

use crate::geometry::Vec2;
use crate::node::{CIRCLE_RADIUS, Node, NodeId};
use crate::piece::{PARTS_PER_PIECE, PieceIndex};
use crate::rng::SimRng;

/// Distance a traveling segment covers per tick, in normalized space.
const STEP_SIZE: f64 = 0.005;

/// Extra reach beyond the receiver's circle at which entry is attempted.
const ENTRY_MARGIN: f64 = 0.01;

/// Smallest random display-size factor for a segment.
const MIN_SEGMENT_SIZE: f64 = 0.3;

/// Width of the random display-size range; sizes land in `[0.3, 0.6)`.
const SEGMENT_SIZE_SPREAD: f64 = 0.3;

/// One sub-part of a piece in flight.
#[derive(Debug, Clone)]
struct Segment {
    position: Vec2,
    /// Display-size factor, rendering only.
    size: f64,
    /// Remaining start-delay ticks. The segment is released at the
    /// sender's position when this expires.
    delay: u32,
    /// Set once the receiver has accepted this segment's part.
    entered: bool,
}

impl Segment {
    fn new(rng: &mut SimRng) -> Self {
        Self {
            // Placeholder until release; delaying segments are neither
            // drawn nor moved.
            position: Vec2::CENTER,
            size: MIN_SEGMENT_SIZE + SEGMENT_SIZE_SPREAD * rng.random_f64(),
            delay: rng.random_range(1, 4) as u32,
            entered: false,
        }
    }

    /// Advances the segment one tick toward the receiver. Returns `true`
    /// when the segment has entered and is within one step of arrival.
    fn advance(&mut self, receiver: &mut Node, piece: PieceIndex, rng: &mut SimRng) -> bool {
        let receiver_position = receiver.position();
        let distance = self.position.distance_to(receiver_position);
        let mut target = receiver_position;

        if self.entered {
            if distance < STEP_SIZE {
                return true;
            }
        } else if distance <= CIRCLE_RADIUS + ENTRY_MARGIN {
            if receiver.try_prepare_receive_part(piece) {
                self.entered = true;
            } else {
                // Congestion: drift toward a random point this tick
                target = Vec2::new(rng.random_f64(), rng.random_f64());
            }
        }

        self.position.step_toward(target, STEP_SIZE);
        false
    }
}

/// A simulated unicast delivery of one piece between two nodes.
///
/// Holds node identifiers rather than references; the swarm resolves
/// them each tick and aborts the transfer if either endpoint has left
/// the roster.
#[derive(Debug, Clone)]
pub struct Transfer {
    sender: NodeId,
    receiver: NodeId,
    piece: PieceIndex,
    segments: Vec<Segment>,
    /// Index of the current head; segments before it have arrived.
    head: usize,
}

impl Transfer {
    pub(crate) fn new(
        sender: NodeId,
        receiver: NodeId,
        piece: PieceIndex,
        rng: &mut SimRng,
    ) -> Self {
        let segments = (0..PARTS_PER_PIECE).map(|_| Segment::new(rng)).collect();
        Self {
            sender,
            receiver,
            piece,
            segments,
            head: 0,
        }
    }

    pub fn sender(&self) -> NodeId {
        self.sender
    }

    pub fn receiver(&self) -> NodeId {
        self.receiver
    }

    pub fn piece(&self) -> PieceIndex {
        self.piece
    }

    /// Number of segments still in flight (delaying ones included).
    pub fn remaining_segments(&self) -> usize {
        self.segments.len() - self.head
    }

    /// Positions and sizes of released segments, head first. Segments
    /// still waiting out their delay are omitted.
    pub fn live_segments(&self) -> impl Iterator<Item = (Vec2, f64)> + '_ {
        self.segments[self.head..]
            .iter()
            .filter(|segment| segment.delay == 0)
            .map(|segment| (segment.position, segment.size))
    }

    /// Steps the chain by one tick. Returns `true` once the whole piece
    /// has been delivered and credited to the receiver.
    ///
    /// The chain advances head-first and stalls at the first segment
    /// still counting down its delay, so segments release one per tick
    /// at most. Motion runs back-to-front: trailing segments contend for
    /// the receiver's congestion gate before the head does, reproducing
    /// the staggered-tail arrival pattern.
    pub(crate) fn step(&mut self, sender_position: Vec2, receiver: &mut Node, rng: &mut SimRng) -> bool {
        if self.head >= self.segments.len() {
            return true;
        }

        // Count down at most one delaying segment per tick; everything
        // behind it stays frozen.
        let live = &mut self.segments[self.head..];
        let mut moving = live.len();
        for (offset, segment) in live.iter_mut().enumerate() {
            if segment.delay > 0 {
                segment.delay -= 1;
                if segment.delay == 0 {
                    segment.position = sender_position;
                }
                moving = offset;
                break;
            }
        }

        let mut head_arrived = false;
        for offset in (0..moving).rev() {
            let arrived = live[offset].advance(receiver, self.piece, rng);
            if offset == 0 {
                head_arrived = arrived;
            }
        }

        if head_arrived {
            self.head += 1;
            trace!(
                piece = %self.piece,
                receiver = %self.receiver,
                remaining = self.remaining_segments(),
                "segment arrived"
            );
            if self.head == self.segments.len() {
                receiver.credit_piece(self.piece);
                return true;
            }
        }

        false
    }
}

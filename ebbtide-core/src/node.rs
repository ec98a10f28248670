//! Swarm participant: piece possession, request/send throttling, receive
//! congestion, and smoothed position/color state.

use std::fmt;

use serde::Serialize;

use crate::Result;
use crate::color::Rgb;
use crate::geometry::Vec2;
use crate::piece::{PARTS_PER_PIECE, PIECE_COUNT, PieceIndex, PieceLedger};
use crate::rng::SimRng;

/// Radius of a node's circle in normalized space. Segments closing on a
/// receiver attempt entry within this radius (plus a small margin).
pub const CIRCLE_RADIUS: f64 = 0.09;

/// Fraction of the remaining distance a node's position covers per tick.
const POSITION_SMOOTHING: f64 = 0.02;

/// Fraction of the remaining distance a node's color covers per tick.
const COLOR_SMOOTHING: f32 = 0.005;

/// Congestion added per accepted piece part. One unit decays per tick, so
/// a receiver absorbs at most a couple of parts in quick succession before
/// rejecting arrivals.
const CONGESTION_PER_PART: f64 = 0.4;

/// Probability that a partial seed owns any given piece.
const PARTIAL_SEED_DENSITY: f64 = 0.5;

/// Identifier of a node within one swarm, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// A swarm participant.
///
/// Nodes own piece state and the two protocol timers. Position and color
/// are smoothed toward targets assigned by the swarm layout each tick;
/// the smoothed position is simulation state proper, since segment
/// delivery geometry depends on it.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    actual_position: Vec2,
    target_position: Vec2,
    actual_color: Rgb,
    target_color: Rgb,
    ledger: PieceLedger,
    /// Ticks until the node may grant another upload. Decremented without
    /// a floor; readiness is `<= 0`.
    send_cooldown: i64,
    /// Ticks until the node may issue another request. Same convention.
    request_cooldown: i64,
    send_interval: i64,
    request_interval: i64,
    congestion: f64,
    is_seed: bool,
}

impl Node {
    /// Creates a node at the center of the space with an empty ledger.
    ///
    /// Both cooldowns start at 1: the node becomes ready on its second
    /// tick, after the first tick's unconditional decrement.
    pub fn new(id: NodeId, send_interval: u32, request_interval: u32) -> Self {
        Self {
            id,
            actual_position: Vec2::CENTER,
            target_position: Vec2::CENTER,
            actual_color: Rgb::BLACK,
            target_color: Rgb::BLACK,
            ledger: PieceLedger::new(),
            send_cooldown: 1,
            request_cooldown: 1,
            send_interval: i64::from(send_interval),
            request_interval: i64::from(request_interval),
            congestion: 0.0,
            is_seed: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Smoothed position consumed by delivery geometry and rendering.
    pub fn position(&self) -> Vec2 {
        self.actual_position
    }

    pub(crate) fn set_target_position(&mut self, target: Vec2) {
        self.target_position = target;
    }

    /// Smoothed display color.
    pub fn color(&self) -> Rgb {
        self.actual_color
    }

    pub(crate) fn set_target_color(&mut self, target: Rgb) {
        self.target_color = target;
    }

    /// Advances position and color smoothing by one tick.
    pub(crate) fn step_motion(&mut self) {
        self.actual_position
            .approach(self.target_position, POSITION_SMOOTHING);
        self.actual_color.approach(self.target_color, COLOR_SMOOTHING);
    }

    /// Closes out the node's tick: both cooldowns decrement
    /// unconditionally, congestion decays by one unit while positive.
    pub(crate) fn step_timers(&mut self) {
        self.send_cooldown -= 1;
        self.request_cooldown -= 1;
        if self.congestion > 0.0 {
            self.congestion -= 1.0;
        }
    }

    /// Grants the node pieces as a distributor.
    ///
    /// A full seed receives the whole catalog; a partial one each piece
    /// independently with probability 0.5.
    pub fn make_seed(&mut self, partial: bool, rng: &mut SimRng) {
        for i in 0..PIECE_COUNT {
            if !partial || rng.random_bool(PARTIAL_SEED_DENSITY) {
                self.credit_piece(PieceIndex::new(i as u32));
                self.ledger.mark_parts_complete(i);
            }
        }
    }

    /// Returns whether the node owns the piece.
    ///
    /// # Errors
    /// - `SwarmError::PieceIndexOutOfRange` - Index is not within the catalog
    pub fn has_piece(&self, index: PieceIndex) -> Result<bool> {
        self.ledger.is_owned(index)
    }

    /// Idempotently marks the piece owned.
    ///
    /// Completing the catalog flips the node to seed status, a one-way
    /// transition that snaps the displayed color to white. The color
    /// target is untouched; layout keeps reassigning it, so the flash
    /// fades back toward the node's hue.
    ///
    /// # Errors
    /// - `SwarmError::PieceIndexOutOfRange` - Index is not within the catalog
    pub fn add_piece(&mut self, index: PieceIndex) -> Result<()> {
        self.ledger.mark_owned(index)?;
        self.check_seed_transition();
        Ok(())
    }

    /// Ownership credit for indexes valid by construction (transfer
    /// delivery, seeding).
    pub(crate) fn credit_piece(&mut self, index: PieceIndex) {
        debug_assert!(index.as_usize() < PIECE_COUNT);
        self.ledger.set_owned(index.as_usize());
        self.check_seed_transition();
    }

    fn check_seed_transition(&mut self) {
        if !self.is_seed && self.ledger.is_complete() {
            self.is_seed = true;
            self.actual_color = Rgb::WHITE;
        }
    }

    /// Whether the node owns the entire catalog. One-way.
    pub fn is_seed(&self) -> bool {
        self.is_seed
    }

    pub fn owned_count(&self) -> usize {
        self.ledger.owned_count()
    }

    /// Owned share of the catalog as a percentage.
    pub fn completion_percent(&self) -> f64 {
        self.ledger.completion_percent()
    }

    /// Whether the node could grant an upload of `piece` right now.
    pub(crate) fn can_grant(&self, piece: PieceIndex) -> bool {
        self.ledger.owns(piece.as_usize()) && self.send_cooldown <= 0
    }

    /// Commits to an upload, restarting the send cooldown.
    pub(crate) fn begin_upload(&mut self) {
        self.send_cooldown = self.send_interval;
    }

    /// Whether the node may issue a new piece request this tick.
    pub(crate) fn ready_to_request(&self) -> bool {
        self.request_cooldown <= 0
    }

    /// Records that a request for `piece` went out, restarting the
    /// request cooldown.
    pub(crate) fn note_request_sent(&mut self, piece: PieceIndex) {
        self.ledger.mark_requested(piece);
        self.request_cooldown = self.request_interval;
    }

    /// Pieces the node neither owns nor has an outstanding request for.
    pub(crate) fn missing_unrequested(&self) -> Vec<PieceIndex> {
        self.ledger.missing_unrequested()
    }

    /// Receive-side backpressure gate for an arriving piece part.
    ///
    /// Rejects while any congestion remains; acceptance records the part
    /// and raises congestion, throttling immediate follow-ups.
    pub(crate) fn try_prepare_receive_part(&mut self, piece: PieceIndex) -> bool {
        if self.congestion > 0.0 {
            return false;
        }

        self.ledger.record_part(piece);
        self.congestion += CONGESTION_PER_PART;
        true
    }

    /// Whether the receive gate is currently closed.
    pub fn is_congested(&self) -> bool {
        self.congestion > 0.0
    }

    pub(crate) fn owns_index(&self, index: usize) -> bool {
        self.ledger.owns(index)
    }

    /// Per-piece received-part fractions in `0.0..=1.0`, for progress
    /// display.
    pub fn piece_progress(&self) -> Vec<f32> {
        (0..PIECE_COUNT)
            .map(|i| self.ledger.parts_received(i) as f32 / PARTS_PER_PIECE as f32)
            .collect()
    }
}

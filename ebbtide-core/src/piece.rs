//! Piece catalog model and per-node possession ledger.

use std::fmt;

use serde::Serialize;

use crate::{Result, SwarmError};

/// Number of pieces in the fixed content catalog shared by every node.
pub const PIECE_COUNT: usize = 100;

/// Number of sub-parts a piece is split into while in transit.
///
/// Parts exist for transfer staggering and progress display only;
/// completion is tracked per whole piece.
pub const PARTS_PER_PIECE: u32 = 50;

/// Zero-based index of a piece within the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PieceIndex(pub u32);

impl PieceIndex {
    /// Creates a PieceIndex from a zero-based index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index as usize.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-node record of which pieces are owned, partially received, or
/// already requested.
///
/// Ownership is write-once: a piece marked owned stays owned for the
/// node's lifetime. Request flags are never cleared; they become
/// irrelevant once the piece is owned.
#[derive(Debug, Clone)]
pub struct PieceLedger {
    owned: [bool; PIECE_COUNT],
    parts_received: [u32; PIECE_COUNT],
    requested: [bool; PIECE_COUNT],
}

impl Default for PieceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceLedger {
    /// Creates an empty ledger: no pieces owned, none requested.
    pub fn new() -> Self {
        Self {
            owned: [false; PIECE_COUNT],
            parts_received: [0; PIECE_COUNT],
            requested: [false; PIECE_COUNT],
        }
    }

    /// Validates a caller-supplied index against the catalog bounds.
    ///
    /// # Errors
    /// - `SwarmError::PieceIndexOutOfRange` - Index is not within the catalog
    fn checked(index: PieceIndex) -> Result<usize> {
        let i = index.as_usize();
        if i >= PIECE_COUNT {
            return Err(SwarmError::PieceIndexOutOfRange { index });
        }
        Ok(i)
    }

    /// Returns whether the piece is owned.
    ///
    /// # Errors
    /// - `SwarmError::PieceIndexOutOfRange` - Index is not within the catalog
    pub fn is_owned(&self, index: PieceIndex) -> Result<bool> {
        Ok(self.owned[Self::checked(index)?])
    }

    /// Unchecked ownership query for internal iteration over `0..PIECE_COUNT`.
    pub(crate) fn owns(&self, index: usize) -> bool {
        self.owned[index]
    }

    /// Marks the piece owned. Idempotent.
    ///
    /// # Errors
    /// - `SwarmError::PieceIndexOutOfRange` - Index is not within the catalog
    pub fn mark_owned(&mut self, index: PieceIndex) -> Result<()> {
        self.owned[Self::checked(index)?] = true;
        Ok(())
    }

    /// Unchecked ownership write for indexes valid by construction.
    pub(crate) fn set_owned(&mut self, index: usize) {
        self.owned[index] = true;
    }

    /// Records full part progress for one piece, as when seeding a node.
    pub(crate) fn mark_parts_complete(&mut self, index: usize) {
        self.parts_received[index] = PARTS_PER_PIECE;
    }

    /// Records arrival of one part of the piece. Progress display only.
    pub(crate) fn record_part(&mut self, index: PieceIndex) {
        debug_assert!(index.as_usize() < PIECE_COUNT);
        self.parts_received[index.as_usize()] += 1;
    }

    /// Returns received parts for the piece, in `0..=PARTS_PER_PIECE`.
    pub(crate) fn parts_received(&self, index: usize) -> u32 {
        self.parts_received[index]
    }

    /// Marks the piece as having an outstanding request.
    pub(crate) fn mark_requested(&mut self, index: PieceIndex) {
        debug_assert!(index.as_usize() < PIECE_COUNT);
        self.requested[index.as_usize()] = true;
    }

    /// Pieces neither owned nor already requested, in catalog order.
    pub(crate) fn missing_unrequested(&self) -> Vec<PieceIndex> {
        (0..PIECE_COUNT)
            .filter(|&i| !self.owned[i] && !self.requested[i])
            .map(|i| PieceIndex::new(i as u32))
            .collect()
    }

    /// Number of owned pieces.
    pub fn owned_count(&self) -> usize {
        self.owned.iter().filter(|&&o| o).count()
    }

    /// Whether every piece in the catalog is owned.
    pub fn is_complete(&self) -> bool {
        self.owned.iter().all(|&o| o)
    }

    /// Owned share of the catalog as a percentage.
    pub fn completion_percent(&self) -> f64 {
        100.0 * self.owned_count() as f64 / PIECE_COUNT as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_index_display() {
        assert_eq!(PieceIndex::new(42).to_string(), "42");
    }

    #[test]
    fn test_out_of_range_queries_fail() {
        let ledger = PieceLedger::new();
        let at_bound = PieceIndex::new(PIECE_COUNT as u32);
        let way_out = PieceIndex::new(u32::MAX);

        assert_eq!(
            ledger.is_owned(at_bound),
            Err(SwarmError::PieceIndexOutOfRange { index: at_bound })
        );
        assert_eq!(
            ledger.is_owned(way_out),
            Err(SwarmError::PieceIndexOutOfRange { index: way_out })
        );
    }

    #[test]
    fn test_mark_owned_is_idempotent() {
        let mut ledger = PieceLedger::new();
        let piece = PieceIndex::new(7);

        ledger.mark_owned(piece).unwrap();
        ledger.mark_owned(piece).unwrap();

        assert_eq!(ledger.is_owned(piece), Ok(true));
        assert_eq!(ledger.owned_count(), 1);
    }

    #[test]
    fn test_missing_unrequested_excludes_both() {
        let mut ledger = PieceLedger::new();
        ledger.mark_owned(PieceIndex::new(0)).unwrap();
        ledger.mark_requested(PieceIndex::new(1));

        let missing = ledger.missing_unrequested();
        assert_eq!(missing.len(), PIECE_COUNT - 2);
        assert!(!missing.contains(&PieceIndex::new(0)));
        assert!(!missing.contains(&PieceIndex::new(1)));
    }

    #[test]
    fn test_completion_percent() {
        let mut ledger = PieceLedger::new();
        assert_eq!(ledger.completion_percent(), 0.0);

        for i in 0..PIECE_COUNT / 2 {
            ledger.mark_owned(PieceIndex::new(i as u32)).unwrap();
        }
        assert_eq!(ledger.completion_percent(), 50.0);
        assert!(!ledger.is_complete());

        for i in 0..PIECE_COUNT {
            ledger.mark_owned(PieceIndex::new(i as u32)).unwrap();
        }
        assert!(ledger.is_complete());
        assert_eq!(ledger.completion_percent(), 100.0);
    }
}

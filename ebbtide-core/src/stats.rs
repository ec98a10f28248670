//! Swarm-wide availability and confidence metrics.
//!
//! Availability follows the BitTorrent convention: the whole-number part
//! is the minimum per-piece redundancy across the catalog, the fraction
//! is the share of pieces held more widely than that floor. Confidence
//! measures how evenly that surplus is spread over the catalog.

use serde::Serialize;

use crate::node::Node;
use crate::piece::PIECE_COUNT;

/// Swarm health metrics computed from a roster snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    /// Number of nodes owning each piece, indexed by catalog position
    pub piece_availability: Vec<u32>,
    /// Minimum per-piece owner count across the catalog
    pub availability_floor: u32,
    /// Fraction of pieces owned more widely than the floor
    pub surplus_fraction: f64,
    /// `availability_floor + surplus_fraction`, the single health number
    pub availability: f64,
    /// Evenness of the surplus distribution in `(0, 1]`; `None` when the
    /// swarm has no possible surplus (empty, single-node, or perfectly
    /// uniform ownership)
    pub confidence: Option<f64>,
}

/// Computes availability and confidence over the given roster.
pub(crate) fn global_availability(nodes: &[Node]) -> AvailabilityReport {
    let mut piece_availability = vec![0u32; PIECE_COUNT];
    for node in nodes {
        for (index, count) in piece_availability.iter_mut().enumerate() {
            if node.owns_index(index) {
                *count += 1;
            }
        }
    }

    // PIECE_COUNT > 0, so the minimum always exists
    let availability_floor = piece_availability.iter().copied().min().unwrap_or(0);
    let ahead = piece_availability
        .iter()
        .filter(|&&count| count > availability_floor)
        .count();
    let surplus_fraction = ahead as f64 / PIECE_COUNT as f64;
    let availability = f64::from(availability_floor) + surplus_fraction;

    // Maximum possible surplus copies above the floor versus the surplus
    // actually present. A zero denominator means no surplus is possible;
    // confidence is undefined rather than NaN.
    let whole_area =
        surplus_fraction * PIECE_COUNT as f64 * (nodes.len() as f64 - f64::from(availability_floor));
    let confidence = if whole_area > 0.0 {
        let actual_area: f64 = piece_availability
            .iter()
            .map(|&count| f64::from(count - availability_floor))
            .sum();
        Some(actual_area / whole_area)
    } else {
        None
    };

    AvailabilityReport {
        piece_availability,
        availability_floor,
        surplus_fraction,
        availability,
        confidence,
    }
}

/// Point-in-time summary of a swarm, serializable for external tooling.
#[derive(Debug, Clone, Serialize)]
pub struct SwarmStats {
    pub tick: u64,
    pub node_count: usize,
    pub seed_count: usize,
    /// Mean completion percentage across nodes; 0 for an empty swarm
    pub mean_completion_percent: f64,
    pub availability: f64,
    pub confidence: Option<f64>,
    pub transfers_in_flight: usize,
}

impl SwarmStats {
    pub(crate) fn collect(tick: u64, nodes: &[Node], transfers_in_flight: usize) -> Self {
        let report = global_availability(nodes);
        let mean_completion_percent = if nodes.is_empty() {
            0.0
        } else {
            nodes.iter().map(Node::completion_percent).sum::<f64>() / nodes.len() as f64
        };

        Self {
            tick,
            node_count: nodes.len(),
            seed_count: nodes.iter().filter(|node| node.is_seed()).count(),
            mean_completion_percent,
            availability: report.availability,
            confidence: report.confidence,
            transfers_in_flight,
        }
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        let mut line = format!("{} node(s) ({} seed(s))", self.node_count, self.seed_count);
        if self.node_count > 0 {
            line.push_str(&format!(
                ", globally {:.0}% complete",
                self.mean_completion_percent
            ));
        }
        line.push_str(&format!(", availability: {:.2}", self.availability));
        match self.confidence {
            Some(confidence) => line.push_str(&format!(" (cfd {confidence:.2})")),
            None => line.push_str(" (cfd n/a)"),
        }
        line.push_str(&format!(
            ", {} transfer(s) in transit",
            self.transfers_in_flight
        ));
        line
    }
}

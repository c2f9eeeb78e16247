//! Legacy payload adapter.
//!
//! Serde fills missing fields with documented defaults while parsing; this
//! pass repairs values that parse but break an invariant (dangling muscle
//! endpoints, non-positive rest lengths, ragged weight matrices, duplicate
//! NEAT connection pairs). The engine calls it once on every genome it clones
//! or mutates, so nothing downstream has to second-guess field presence.

use super::body::BodyGenome;
use super::creature::{Controller, CreatureGenome};
use super::neat::NeatGenome;
use std::collections::HashSet;

/// Shortest rest length assigned when recomputing from node distance.
pub const MIN_REST_LENGTH: f64 = 0.1;

/// What [`CreatureGenome::normalize`] had to change.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairReport {
    pub multipliers_reset: usize,
    pub muscles_dropped: usize,
    pub rest_lengths_recomputed: usize,
    pub neural_reshaped: bool,
    pub connections_dropped: usize,
}

impl RepairReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl CreatureGenome {
    /// Repairs invariant-breaking values in place.
    pub fn normalize(&mut self) -> RepairReport {
        let mut report = RepairReport::default();
        normalize_body(&mut self.body, &mut report);
        match &mut self.controller {
            Controller::None => {}
            Controller::Fixed(neural) => {
                report.neural_reshaped = neural.conform_shape();
            }
            Controller::Neat(neat) => normalize_neat(neat, &mut report),
        }
        report
    }
}

fn normalize_body(body: &mut BodyGenome, report: &mut RepairReport) {
    for m in [
        &mut body.global_frequency_multiplier,
        &mut body.global_amplitude_multiplier,
    ] {
        if !m.is_finite() || *m <= 0.0 {
            *m = 1.0;
            report.multipliers_reset += 1;
        }
    }

    let ids: HashSet<usize> = body.nodes.iter().map(|n| n.id).collect();
    let mut seen = HashSet::new();
    let before = body.muscles.len();
    body.muscles.retain(|m| {
        m.node_a != m.node_b
            && ids.contains(&m.node_a)
            && ids.contains(&m.node_b)
            && seen.insert(m.endpoints())
    });
    report.muscles_dropped = before - body.muscles.len();

    let lengths: Vec<Option<f64>> = body
        .muscles
        .iter()
        .map(|m| {
            if m.rest_length.is_finite() && m.rest_length > 0.0 {
                None
            } else {
                body.node_distance(m.node_a, m.node_b)
            }
        })
        .collect();
    for (m, len) in body.muscles.iter_mut().zip(lengths) {
        if let Some(d) = len {
            m.rest_length = d.max(MIN_REST_LENGTH);
            report.rest_lengths_recomputed += 1;
        }
    }
}

fn normalize_neat(neat: &mut NeatGenome, report: &mut RepairReport) {
    let ids: HashSet<usize> = neat.nodes.iter().map(|n| n.id).collect();
    let mut pairs = HashSet::new();
    let before = neat.connections.len();
    neat.connections.retain(|c| {
        ids.contains(&c.from_node)
            && ids.contains(&c.to_node)
            && pairs.insert((c.from_node, c.to_node))
    });
    report.connections_dropped = before - neat.connections.len();
}

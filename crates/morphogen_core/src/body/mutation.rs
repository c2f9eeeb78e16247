use super::topology::{random_muscle, random_node, unconnected_pairs};
use super::*;
use crate::sampling::chance;

/// Distance scale of a node budded off an existing one.
const BUD_OFFSET: f64 = 0.5;

/// Applies parametric then structural mutation with the effective rates in
/// `config` (already decayed or boosted by the caller).
pub fn mutate_with_config<R: Rng>(body: &mut BodyGenome, config: &EvolutionConfig, rng: &mut R) {
    let rate = config.mutation.rate;
    let magnitude = config.mutation.magnitude;

    for node in &mut body.nodes {
        if chance(rng, rate) {
            perturb_node(node, magnitude, rng);
        }
    }
    for muscle in &mut body.muscles {
        if chance(rng, rate) {
            perturb_muscle(muscle, magnitude, rng);
        }
    }
    if chance(rng, rate) {
        body.global_frequency_multiplier =
            GLOBAL_MULTIPLIER.perturb(body.global_frequency_multiplier, magnitude, rng);
    }
    if chance(rng, rate) {
        body.global_amplitude_multiplier =
            GLOBAL_MULTIPLIER.perturb(body.global_amplitude_multiplier, magnitude, rng);
    }

    let structural = config.mutation.structural_rate;
    if chance(rng, structural) {
        add_node(body, &config.body, rng);
    }
    if chance(rng, structural) {
        remove_node(body, &config.body, rng);
    }
    if chance(rng, structural) {
        add_muscle(body, &config.body, rng);
    }
    if chance(rng, structural) {
        remove_muscle(body, &config.body, rng);
    }
}

fn perturb_node<R: Rng>(node: &mut BodyNode, magnitude: f64, rng: &mut R) {
    node.position[0] = POSITION_XZ.perturb(node.position[0], magnitude, rng);
    node.position[1] = POSITION_Y.perturb(node.position[1], magnitude, rng);
    node.position[2] = POSITION_XZ.perturb(node.position[2], magnitude, rng);
    node.size = NODE_SIZE.perturb(node.size, magnitude, rng);
    node.mass = NODE_MASS.perturb(node.mass, magnitude, rng);
    node.friction = NODE_FRICTION.perturb(node.friction, magnitude, rng);
    node.restitution = NODE_RESTITUTION.perturb(node.restitution, magnitude, rng);
}

fn perturb_muscle<R: Rng>(muscle: &mut Muscle, magnitude: f64, rng: &mut R) {
    muscle.rest_length = REST_LENGTH.perturb(muscle.rest_length, magnitude, rng);
    muscle.stiffness = STIFFNESS.perturb(muscle.stiffness, magnitude, rng);
    muscle.damping = DAMPING.perturb(muscle.damping, magnitude, rng);
    muscle.frequency = FREQUENCY.perturb(muscle.frequency, magnitude, rng);
    muscle.amplitude = AMPLITUDE.perturb(muscle.amplitude, magnitude, rng);
    muscle.phase = wrap_phase(muscle.phase + gaussian(rng) * magnitude * TAU);
}

/// Buds a node off a random anchor and ties it on with a muscle.
/// Returns the new node id.
pub fn add_node<R: Rng>(body: &mut BodyGenome, bounds: &BodyConfig, rng: &mut R) -> Option<usize> {
    if body.nodes.is_empty()
        || body.nodes.len() >= bounds.max_nodes
        || body.muscles.len() >= bounds.max_muscles
    {
        return None;
    }
    let anchor = &body.nodes[rng.gen_range(0..body.nodes.len())];
    let anchor_id = anchor.id;
    let base = anchor.position;
    let position = [
        POSITION_XZ.clamp(base[0] + gaussian(rng) * BUD_OFFSET),
        POSITION_Y.clamp(base[1] + gaussian(rng) * BUD_OFFSET),
        POSITION_XZ.clamp(base[2] + gaussian(rng) * BUD_OFFSET),
    ];
    let id = body.next_node_id();
    body.nodes.push(random_node(id, position, rng));
    let muscle = random_muscle(body, body.next_muscle_id(), anchor_id, id, rng);
    body.muscles.push(muscle);
    Some(id)
}

/// Removes a random node and its muscles, unless that would leave the body
/// under its node or muscle floor.
pub fn remove_node<R: Rng>(body: &mut BodyGenome, bounds: &BodyConfig, rng: &mut R) -> Option<usize> {
    if body.nodes.len() <= bounds.min_nodes {
        return None;
    }
    let victim = body.nodes[rng.gen_range(0..body.nodes.len())].id;
    let remaining = body
        .muscles
        .iter()
        .filter(|m| m.node_a != victim && m.node_b != victim)
        .count();
    if remaining < bounds.min_muscles.max(1) {
        return None;
    }
    body.nodes.retain(|n| n.id != victim);
    body.muscles.retain(|m| m.node_a != victim && m.node_b != victim);
    Some(victim)
}

/// Joins two currently unconnected nodes. No-op when every pair is taken.
pub fn add_muscle<R: Rng>(body: &mut BodyGenome, bounds: &BodyConfig, rng: &mut R) -> Option<usize> {
    if body.muscles.len() >= bounds.max_muscles {
        return None;
    }
    let free = unconnected_pairs(body);
    if free.is_empty() {
        return None;
    }
    let (a, b) = free[rng.gen_range(0..free.len())];
    let id = body.next_muscle_id();
    let muscle = random_muscle(body, id, a, b, rng);
    body.muscles.push(muscle);
    Some(id)
}

/// Drops a random muscle, always keeping at least one.
pub fn remove_muscle<R: Rng>(body: &mut BodyGenome, bounds: &BodyConfig, rng: &mut R) -> Option<usize> {
    if body.muscles.len() <= bounds.min_muscles.max(1) {
        return None;
    }
    let idx = rng.gen_range(0..body.muscles.len());
    Some(body.muscles.remove(idx).id)
}

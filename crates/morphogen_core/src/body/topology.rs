use super::*;
use morphogen_data::data::normalize::MIN_REST_LENGTH;
use std::collections::HashSet;

/// A node with random physical properties at `position`.
pub fn random_node<R: Rng>(id: usize, position: [f64; 3], rng: &mut R) -> BodyNode {
    BodyNode {
        id,
        position,
        size: NODE_SIZE.sample(rng),
        mass: NODE_MASS.sample(rng),
        friction: NODE_FRICTION.sample(rng),
        restitution: NODE_RESTITUTION.sample(rng),
    }
}

/// A muscle with random oscillator properties; rest length follows the
/// current node distance.
pub fn random_muscle<R: Rng>(body: &BodyGenome, id: usize, a: usize, b: usize, rng: &mut R) -> Muscle {
    let rest_length = body
        .node_distance(a, b)
        .map_or(1.0, |d| REST_LENGTH.clamp(d.max(MIN_REST_LENGTH)));
    Muscle {
        id,
        node_a: a,
        node_b: b,
        rest_length,
        stiffness: STIFFNESS.sample(rng),
        damping: DAMPING.sample(rng),
        frequency: FREQUENCY.sample(rng),
        amplitude: AMPLITUDE.sample(rng),
        phase: rng.gen_range(0.0..TAU),
    }
}

/// Node ids that no muscle joins yet, as ordered pairs.
///
/// Works on a snapshot of the connected relation so callers may push new
/// muscles while walking the result.
#[must_use]
pub fn unconnected_pairs(body: &BodyGenome) -> Vec<(usize, usize)> {
    let connected: HashSet<(usize, usize)> = body.muscles.iter().map(|m| m.endpoints()).collect();
    let ids: Vec<usize> = body.nodes.iter().map(|n| n.id).collect();
    let mut pairs = Vec::new();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let key = if a <= b { (a, b) } else { (b, a) };
            if !connected.contains(&key) {
                pairs.push(key);
            }
        }
    }
    pairs
}

/// Fewest nodes whose pairs can carry `muscles` distinct muscles.
fn nodes_to_hold(muscles: usize) -> usize {
    let mut n = 2;
    while n * (n - 1) / 2 < muscles {
        n += 1;
    }
    n
}

/// Random connected body within the configured bounds.
///
/// Nodes are chained into a random spanning tree first, so every node has
/// at least one muscle when `max_muscles` allows it; extra muscles are then
/// drawn from the unconnected pairs.
pub fn create_body_random_with_rng<R: Rng>(config: &BodyConfig, rng: &mut R) -> BodyGenome {
    let max_nodes = config.max_nodes.max(config.min_nodes);
    let min_nodes = config.min_nodes.max(nodes_to_hold(config.min_muscles)).min(max_nodes);
    let node_count = rng.gen_range(min_nodes..=max_nodes);
    let r = config.spawn_radius;

    let mut body = BodyGenome::default();
    for id in 0..node_count {
        let position = [
            POSITION_XZ.clamp(rng.gen_range(-r..=r)),
            POSITION_Y.clamp(rng.gen_range(0.5..=0.5 + r)),
            POSITION_XZ.clamp(rng.gen_range(-r..=r)),
        ];
        body.nodes.push(random_node(id, position, rng));
    }

    for id in 1..node_count {
        if body.muscles.len() >= config.max_muscles {
            break;
        }
        let partner = rng.gen_range(0..id);
        let muscle = random_muscle(&body, body.next_muscle_id(), partner, id, rng);
        body.muscles.push(muscle);
    }

    let extra = rng.gen_range(0..=node_count / 2);
    let target = (body.muscles.len() + extra)
        .max(config.min_muscles)
        .min(config.max_muscles);
    let mut free = unconnected_pairs(&body);
    while body.muscles.len() < target && !free.is_empty() {
        let (a, b) = free.swap_remove(rng.gen_range(0..free.len()));
        let muscle = random_muscle(&body, body.next_muscle_id(), a, b, rng);
        body.muscles.push(muscle);
    }

    body.global_frequency_multiplier = 1.0;
    body.global_amplitude_multiplier = 1.0;
    body
}

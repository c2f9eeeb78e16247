use super::*;
use std::collections::{HashMap, HashSet};

/// Whether enabling `from -> to` would close a loop through enabled
/// connections. Self-loops count.
#[must_use]
pub fn would_create_cycle(genome: &NeatGenome, from: usize, to: usize) -> bool {
    if from == to {
        return true;
    }
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for c in genome.connections.iter().filter(|c| c.enabled) {
        adjacency.entry(c.from_node).or_default().push(c.to_node);
    }
    let mut stack = vec![to];
    let mut visited = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == from {
            return true;
        }
        if !visited.insert(node) {
            continue;
        }
        if let Some(next) = adjacency.get(&node) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

/// Adds a connection between two unconnected nodes. Sources are inputs or
/// hidden nodes, targets hidden nodes or outputs. Returns the innovation id,
/// or `None` when no candidate pair exists.
pub fn add_connection<R: Rng>(
    genome: &mut NeatGenome,
    neat: &NeatConfig,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) -> Option<usize> {
    let existing: HashSet<(usize, usize)> = genome
        .connections
        .iter()
        .map(|c| (c.from_node, c.to_node))
        .collect();
    let mut candidates = Vec::new();
    for src in genome.nodes.iter().filter(|n| n.node_type != NodeType::Output) {
        for dst in genome.nodes.iter().filter(|n| n.node_type != NodeType::Input) {
            let pair = (src.id, dst.id);
            if src.id == dst.id || existing.contains(&pair) {
                continue;
            }
            if neat.feedforward_only && would_create_cycle(genome, src.id, dst.id) {
                continue;
            }
            candidates.push(pair);
        }
    }
    if candidates.is_empty() {
        return None;
    }
    let (from, to) = candidates[rng.gen_range(0..candidates.len())];
    let innovation = registry.connection_innovation(from, to);
    genome.connections.push(NeatConnection {
        from_node: from,
        to_node: to,
        weight: symmetric(rng, neat.weight_range),
        enabled: true,
        innovation,
    });
    Some(innovation)
}

/// Splits a random enabled connection `a -> b` into `a -> new -> b`.
///
/// The old gene is disabled; the incoming gene gets weight 1 and the
/// outgoing one the old weight, so behavior is initially preserved.
/// Returns the new node id.
pub fn add_node<R: Rng>(
    genome: &mut NeatGenome,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) -> Option<usize> {
    let enabled: Vec<usize> = genome
        .connections
        .iter()
        .enumerate()
        .filter(|(_, c)| c.enabled)
        .map(|(i, _)| i)
        .collect();
    if enabled.is_empty() {
        return None;
    }
    let idx = enabled[rng.gen_range(0..enabled.len())];
    let split = genome.connections[idx].clone();

    let node_innovation = registry.node_innovation(split.innovation);
    let id = hidden_node_id(genome, node_innovation);
    if genome.has_node(id)
        || genome.has_connection(split.from_node, id)
        || genome.has_connection(id, split.to_node)
    {
        return None;
    }

    genome.connections[idx].enabled = false;
    genome.nodes.push(NeatNode {
        id,
        node_type: NodeType::Hidden,
        bias: 0.0,
        innovation: Some(node_innovation),
    });
    genome.connections.push(NeatConnection {
        from_node: split.from_node,
        to_node: id,
        weight: 1.0,
        enabled: true,
        innovation: registry.connection_innovation(split.from_node, id),
    });
    genome.connections.push(NeatConnection {
        from_node: id,
        to_node: split.to_node,
        weight: split.weight,
        enabled: true,
        innovation: registry.connection_innovation(id, split.to_node),
    });
    Some(id)
}

/// Re-enables a random disabled connection, unless it would close a cycle
/// in feedforward mode.
pub fn enable_connection<R: Rng>(genome: &mut NeatGenome, neat: &NeatConfig, rng: &mut R) -> bool {
    let disabled: Vec<usize> = genome
        .connections
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.enabled)
        .map(|(i, _)| i)
        .collect();
    if disabled.is_empty() {
        return false;
    }
    let idx = disabled[rng.gen_range(0..disabled.len())];
    let (from, to) = (genome.connections[idx].from_node, genome.connections[idx].to_node);
    if neat.feedforward_only && would_create_cycle(genome, from, to) {
        return false;
    }
    genome.connections[idx].enabled = true;
    true
}

pub fn disable_connection<R: Rng>(genome: &mut NeatGenome, rng: &mut R) -> bool {
    let enabled: Vec<usize> = genome
        .connections
        .iter()
        .enumerate()
        .filter(|(_, c)| c.enabled)
        .map(|(i, _)| i)
        .collect();
    if enabled.is_empty() {
        return false;
    }
    let idx = enabled[rng.gen_range(0..enabled.len())];
    genome.connections[idx].enabled = false;
    true
}

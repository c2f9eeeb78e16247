use super::alignment::GeneAlignment;
use super::topology::would_create_cycle;
use super::*;
use crate::selection::compare_fitness;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Which parent's unmatched genes the child inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fitter {
    A,
    B,
    Tie,
}

/// Innovation-aligned NEAT crossover.
///
/// The child keeps every input and output of both parents plus the hidden
/// nodes its connections reference, so it is always well formed. In
/// feedforward mode genes that would close a cycle are inherited disabled.
pub fn neat_crossover_with_rng<R: Rng>(
    a: &NeatGenome,
    b: &NeatGenome,
    fitness_a: f64,
    fitness_b: f64,
    neat: &NeatConfig,
    rng: &mut R,
) -> NeatGenome {
    let fitter = match compare_fitness(fitness_a, fitness_b) {
        Ordering::Greater => Fitter::A,
        Ordering::Less => Fitter::B,
        Ordering::Equal => Fitter::Tie,
    };
    let alignment = GeneAlignment::new(a, b);

    let mut genes: Vec<NeatConnection> = Vec::new();
    for &(ga, gb) in &alignment.matching {
        let (chosen, other) = if rng.gen::<bool>() { (ga, gb) } else { (gb, ga) };
        let mut gene = chosen.clone();
        if !gene.enabled && other.enabled && chance(rng, neat.reenable_rate) {
            gene.enabled = true;
        }
        genes.push(gene);
    }
    if fitter != Fitter::B {
        genes.extend(alignment.disjoint_a.iter().map(|&g| g.clone()));
        genes.extend(alignment.excess_a.iter().map(|&g| g.clone()));
    }
    if fitter != Fitter::A {
        genes.extend(alignment.disjoint_b.iter().map(|&g| g.clone()));
        genes.extend(alignment.excess_b.iter().map(|&g| g.clone()));
    }
    genes.sort_by_key(|g| g.innovation);

    let node_pool = node_pool(a, b, fitter, rng);
    let mut child = NeatGenome::default();
    let mut pairs = HashSet::new();
    for gene in genes {
        if node_pool.contains_key(&gene.from_node)
            && node_pool.contains_key(&gene.to_node)
            && pairs.insert((gene.from_node, gene.to_node))
        {
            child.connections.push(gene);
        }
    }

    let referenced: HashSet<usize> = child
        .connections
        .iter()
        .flat_map(|c| [c.from_node, c.to_node])
        .collect();
    child.nodes = node_pool
        .into_values()
        .filter(|n| n.node_type != NodeType::Hidden || referenced.contains(&n.id))
        .collect();

    if neat.feedforward_only {
        break_cycles(&mut child);
    }
    child
}

/// Node genes by id. Nodes in both parents take the gene of a random parent
/// on a tie and of the fitter parent otherwise.
fn node_pool<R: Rng>(
    a: &NeatGenome,
    b: &NeatGenome,
    fitter: Fitter,
    rng: &mut R,
) -> BTreeMap<usize, NeatNode> {
    let mut pool: BTreeMap<usize, NeatNode> = BTreeMap::new();
    for node in &a.nodes {
        pool.entry(node.id).or_insert_with(|| node.clone());
    }
    for node in &b.nodes {
        match pool.get_mut(&node.id) {
            Some(existing) => {
                let take_b = match fitter {
                    Fitter::A => false,
                    Fitter::B => true,
                    Fitter::Tie => rng.gen::<bool>(),
                };
                if take_b && existing.node_type == node.node_type {
                    *existing = node.clone();
                }
            }
            None => {
                pool.insert(node.id, node.clone());
            }
        }
    }
    pool
}

/// Disables, in innovation order, every enabled gene that closes a loop
/// with the genes enabled before it.
fn break_cycles(genome: &mut NeatGenome) {
    let wanted: Vec<bool> = genome.connections.iter().map(|c| c.enabled).collect();
    for c in &mut genome.connections {
        c.enabled = false;
    }
    for (i, enable) in wanted.into_iter().enumerate() {
        if !enable {
            continue;
        }
        let (from, to) = (genome.connections[i].from_node, genome.connections[i].to_node);
        if !would_create_cycle(genome, from, to) {
            genome.connections[i].enabled = true;
        }
    }
}

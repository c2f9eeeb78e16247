use super::topology::{random_muscle, unconnected_pairs};
use super::*;
use std::collections::{HashMap, HashSet};

/// Recombines node and muscle genes position by position.
///
/// `primary` fixes the child's gene counts and topology; genes at positions
/// both parents have are taken from either parent (after a cut point for
/// single-point, by coin flip for uniform). Child ids are renumbered to gene
/// positions. A muscle inherited from `secondary` whose endpoints do not map
/// onto distinct child nodes, or that would duplicate a pair already joined,
/// falls back to the primary's muscle at that position.
///
/// A child left under `bounds.min_muscles` by colliding pairs is topped up
/// with the primary muscles it displaced, then with new muscles on free
/// pairs.
pub fn body_crossover_with_rng<R: Rng>(
    primary: &BodyGenome,
    secondary: &BodyGenome,
    method: BodyCrossoverMethod,
    bounds: &BodyConfig,
    rng: &mut R,
) -> BodyGenome {
    let node_picks = pick_sources(primary.nodes.len(), secondary.nodes.len(), method, rng);
    let muscle_picks = pick_sources(primary.muscles.len(), secondary.muscles.len(), method, rng);

    let primary_index = index_of(primary);
    let secondary_index = index_of(secondary);

    let nodes: Vec<BodyNode> = primary
        .nodes
        .iter()
        .enumerate()
        .map(|(i, own)| {
            let source = if node_picks[i] { &secondary.nodes[i] } else { own };
            BodyNode {
                id: i,
                ..source.clone()
            }
        })
        .collect();

    let mut joined: HashSet<(usize, usize)> = HashSet::new();
    let mut muscles = Vec::with_capacity(primary.muscles.len());
    let mut displaced = Vec::new();
    for (i, own) in primary.muscles.iter().enumerate() {
        let own = remap(own, &primary_index, nodes.len());
        let from_secondary = if muscle_picks[i] {
            remap(&secondary.muscles[i], &secondary_index, nodes.len())
                .filter(|m| !joined.contains(&m.endpoints()))
        } else {
            None
        };
        let chosen = match from_secondary {
            Some(m) => {
                displaced.extend(own);
                Some(m)
            }
            None => own.filter(|m| !joined.contains(&m.endpoints())),
        };
        let Some(muscle) = chosen else {
            continue;
        };
        joined.insert(muscle.endpoints());
        muscles.push(Muscle {
            id: muscles.len(),
            ..muscle
        });
    }

    let (freq, amp) = match method {
        BodyCrossoverMethod::SinglePoint => (
            primary.global_frequency_multiplier,
            primary.global_amplitude_multiplier,
        ),
        BodyCrossoverMethod::Uniform => (
            if rng.gen::<bool>() {
                secondary.global_frequency_multiplier
            } else {
                primary.global_frequency_multiplier
            },
            if rng.gen::<bool>() {
                secondary.global_amplitude_multiplier
            } else {
                primary.global_amplitude_multiplier
            },
        ),
    };

    let mut child = BodyGenome {
        nodes,
        muscles,
        global_frequency_multiplier: freq,
        global_amplitude_multiplier: amp,
    };
    fill_muscle_floor(&mut child, displaced, bounds, rng);
    child
}

fn fill_muscle_floor<R: Rng>(
    child: &mut BodyGenome,
    displaced: Vec<Muscle>,
    bounds: &BodyConfig,
    rng: &mut R,
) {
    let floor = bounds.min_muscles.min(bounds.max_muscles);
    if child.muscles.len() >= floor {
        return;
    }
    let mut joined: HashSet<(usize, usize)> = child.muscles.iter().map(|m| m.endpoints()).collect();
    for muscle in displaced {
        if child.muscles.len() >= floor {
            return;
        }
        if joined.insert(muscle.endpoints()) {
            let id = child.muscles.len();
            child.muscles.push(Muscle { id, ..muscle });
        }
    }
    let mut free = unconnected_pairs(child);
    while child.muscles.len() < floor && !free.is_empty() {
        let (a, b) = free.swap_remove(rng.gen_range(0..free.len()));
        let muscle = random_muscle(child, child.muscles.len(), a, b, rng);
        child.muscles.push(muscle);
    }
}

/// For each primary position, whether the gene comes from the secondary.
fn pick_sources<R: Rng>(
    primary_len: usize,
    secondary_len: usize,
    method: BodyCrossoverMethod,
    rng: &mut R,
) -> Vec<bool> {
    let shared = primary_len.min(secondary_len);
    match method {
        BodyCrossoverMethod::SinglePoint => {
            let cut = if shared == 0 { 0 } else { rng.gen_range(0..=shared) };
            (0..primary_len).map(|i| i >= cut && i < shared).collect()
        }
        BodyCrossoverMethod::Uniform => (0..primary_len)
            .map(|i| i < shared && rng.gen::<bool>())
            .collect(),
    }
}

/// Node id to gene position.
fn index_of(body: &BodyGenome) -> HashMap<usize, usize> {
    body.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect()
}

fn remap(muscle: &Muscle, index: &HashMap<usize, usize>, node_count: usize) -> Option<Muscle> {
    let a = *index.get(&muscle.node_a)?;
    let b = *index.get(&muscle.node_b)?;
    if a == b || a >= node_count || b >= node_count {
        return None;
    }
    Some(Muscle {
        node_a: a,
        node_b: b,
        ..muscle.clone()
    })
}

//! Survivor selection policies.
//!
//! Every policy returns survivor indices, elites first. Elites are ranked by
//! raw fitness; the policy itself ranks by effective fitness (shared when
//! fitness sharing is on).

use crate::config::{EvolutionConfig, SelectionConfig, SelectionMethod};
use crate::speciation::Species;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Ascending fitness order where NaN sorts below every number.
#[must_use]
pub fn compare_fitness(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.total_cmp(&b),
    }
}

/// `indices` sorted best first; ties keep input order.
#[must_use]
pub fn ranked(indices: &[usize], fitness: &[f64]) -> Vec<usize> {
    let mut order = indices.to_vec();
    order.sort_by(|&a, &b| compare_fitness(fitness[b], fitness[a]));
    order
}

/// `round(n * (1 - cull))`, at least one survivor and every elite, at most
/// `n`.
#[must_use]
pub fn survivor_quota(n: usize, selection: &SelectionConfig) -> usize {
    if n == 0 {
        return 0;
    }
    let keep = (n as f64 * (1.0 - selection.cull_percentage)).round() as usize;
    keep.max(1).max(selection.elite_count.unwrap_or(0)).min(n)
}

/// Picks survivors with the configured method. `species` is only read by
/// speciation selection, which falls back to truncation without species.
pub fn select_survivors<R: Rng>(
    raw_fitness: &[f64],
    effective_fitness: &[f64],
    species: &[Species],
    config: &EvolutionConfig,
    rng: &mut R,
) -> Vec<usize> {
    let n = raw_fitness.len().min(effective_fitness.len());
    let quota = survivor_quota(n, &config.selection);
    let all: Vec<usize> = (0..n).collect();

    let elite_count = config.selection.elite_count.unwrap_or(0).min(quota);
    let mut survivors: Vec<usize> = ranked(&all, raw_fitness)
        .into_iter()
        .take(elite_count)
        .collect();
    let taken: HashSet<usize> = survivors.iter().copied().collect();
    let pool: Vec<usize> = all.into_iter().filter(|i| !taken.contains(i)).collect();
    let need = quota - survivors.len();

    let picked = match config.selection.method {
        SelectionMethod::Truncation => truncation(&pool, effective_fitness, need),
        SelectionMethod::Tournament => tournament(
            &pool,
            effective_fitness,
            need,
            config.selection.tournament_size,
            rng,
        ),
        SelectionMethod::Rank => rank(&pool, effective_fitness, need, config.selection.rank_pressure, rng),
        SelectionMethod::Speciation => by_species(
            &pool,
            effective_fitness,
            species,
            need,
            config.speciation.min_species_size,
        ),
    };
    survivors.extend(picked);
    tracing::debug!(
        method = ?config.selection.method,
        survivors = survivors.len(),
        elites = elite_count,
        "selected survivors"
    );
    survivors
}

/// Best `need` of `pool`.
#[must_use]
pub fn truncation(pool: &[usize], fitness: &[f64], need: usize) -> Vec<usize> {
    ranked(pool, fitness).into_iter().take(need).collect()
}

/// Repeated tournaments of `size` uniform draws; each winner leaves the
/// pool so survivors are distinct.
pub fn tournament<R: Rng>(
    pool: &[usize],
    fitness: &[f64],
    need: usize,
    size: usize,
    rng: &mut R,
) -> Vec<usize> {
    let mut remaining = pool.to_vec();
    let mut winners = Vec::with_capacity(need);
    while winners.len() < need && !remaining.is_empty() {
        let mut best = rng.gen_range(0..remaining.len());
        for _ in 1..size.max(1) {
            let challenger = rng.gen_range(0..remaining.len());
            if compare_fitness(fitness[remaining[challenger]], fitness[remaining[best]])
                == Ordering::Greater
            {
                best = challenger;
            }
        }
        winners.push(remaining.swap_remove(best));
    }
    winners
}

/// Weighted sampling without replacement; rank `r` (0 = best) of `len`
/// weighs `(len - r)^pressure`.
pub fn rank<R: Rng>(pool: &[usize], fitness: &[f64], need: usize, pressure: f64, rng: &mut R) -> Vec<usize> {
    let mut remaining = ranked(pool, fitness);
    let len = remaining.len();
    let mut weights: Vec<f64> = (0..len).map(|r| ((len - r) as f64).powf(pressure)).collect();
    let mut picked = Vec::with_capacity(need);
    while picked.len() < need && !remaining.is_empty() {
        let idx = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => 0,
        };
        picked.push(remaining.remove(idx));
        weights.remove(idx);
    }
    picked
}

/// Per-species selection. Each species first gets up to
/// `min_species_size` of its best members; the rest of the quota is split
/// in proportion to species average fitness (shifted to be positive), and
/// any slots left by rounding go to the best remaining genomes overall.
#[must_use]
pub fn by_species(
    pool: &[usize],
    fitness: &[f64],
    species: &[Species],
    need: usize,
    min_species_size: usize,
) -> Vec<usize> {
    let in_pool: HashSet<usize> = pool.iter().copied().collect();
    let groups: Vec<Vec<usize>> = species
        .iter()
        .map(|s| {
            let members: Vec<usize> = s.members.iter().copied().filter(|m| in_pool.contains(m)).collect();
            ranked(&members, fitness)
        })
        .filter(|g| !g.is_empty())
        .collect();
    if groups.is_empty() {
        return truncation(pool, fitness, need);
    }

    let averages: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().map(|&i| fitness[i]).sum::<f64>() / g.len() as f64)
        .collect();
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| compare_fitness(averages[b], averages[a]));

    let mut picked: Vec<usize> = Vec::with_capacity(need);
    let mut cursor = vec![0usize; groups.len()];

    for &g in &order {
        let take = min_species_size.min(groups[g].len()).min(need - picked.len());
        picked.extend_from_slice(&groups[g][..take]);
        cursor[g] = take;
        if picked.len() == need {
            return picked;
        }
    }

    let floor = averages
        .iter()
        .copied()
        .filter(|a| a.is_finite())
        .fold(f64::INFINITY, f64::min);
    let weights: Vec<f64> = averages
        .iter()
        .map(|&a| if a.is_finite() { a - floor + 1e-9 } else { 0.0 })
        .collect();
    let total: f64 = weights.iter().sum();
    let budget = need - picked.len();
    if total > 0.0 {
        for &g in &order {
            let share = ((budget as f64) * weights[g] / total).floor() as usize;
            let available = groups[g].len() - cursor[g];
            let take = share.min(available).min(need - picked.len());
            picked.extend_from_slice(&groups[g][cursor[g]..cursor[g] + take]);
            cursor[g] += take;
        }
    }

    if picked.len() < need {
        let leftovers: Vec<usize> = groups
            .iter()
            .zip(&cursor)
            .flat_map(|(g, &c)| g[c..].iter().copied())
            .collect();
        picked.extend(truncation(&leftovers, fitness, need - picked.len()));
    }
    picked
}

//! Gene alignment by innovation id.
//!
//! For parents A and B: ids in both are matching; an id only in A is excess
//! when it is above B's highest id and disjoint otherwise (and vice versa).
//! A parent without connections has no range, so everything in the other
//! parent is excess.

use super::{NeatConnection, NeatGenome};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct GeneAlignment<'a> {
    /// `(gene in A, gene in B)` in innovation order.
    pub matching: Vec<(&'a NeatConnection, &'a NeatConnection)>,
    pub disjoint_a: Vec<&'a NeatConnection>,
    pub disjoint_b: Vec<&'a NeatConnection>,
    pub excess_a: Vec<&'a NeatConnection>,
    pub excess_b: Vec<&'a NeatConnection>,
}

impl<'a> GeneAlignment<'a> {
    pub fn new(a: &'a NeatGenome, b: &'a NeatGenome) -> Self {
        let genes_a = by_innovation(a);
        let genes_b = by_innovation(b);
        let max_a = genes_a.keys().next_back().copied();
        let max_b = genes_b.keys().next_back().copied();

        let mut alignment = GeneAlignment::default();
        for (inn, &gene) in &genes_a {
            match genes_b.get(inn) {
                Some(&other) => alignment.matching.push((gene, other)),
                None if is_beyond(*inn, max_b) => alignment.excess_a.push(gene),
                None => alignment.disjoint_a.push(gene),
            }
        }
        for (inn, &gene) in &genes_b {
            if genes_a.contains_key(inn) {
                continue;
            }
            if is_beyond(*inn, max_a) {
                alignment.excess_b.push(gene);
            } else {
                alignment.disjoint_b.push(gene);
            }
        }
        alignment
    }

    #[must_use]
    pub fn excess_count(&self) -> usize {
        self.excess_a.len() + self.excess_b.len()
    }

    #[must_use]
    pub fn disjoint_count(&self) -> usize {
        self.disjoint_a.len() + self.disjoint_b.len()
    }

    /// Mean absolute weight difference over matching genes, 0 without any.
    #[must_use]
    pub fn mean_weight_difference(&self) -> f64 {
        if self.matching.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .matching
            .iter()
            .map(|(a, b)| (a.weight - b.weight).abs())
            .sum();
        total / self.matching.len() as f64
    }
}

/// First gene per innovation id wins.
fn by_innovation(genome: &NeatGenome) -> BTreeMap<usize, &NeatConnection> {
    let mut genes = BTreeMap::new();
    for c in &genome.connections {
        genes.entry(c.innovation).or_insert(c);
    }
    genes
}

fn is_beyond(innovation: usize, max_other: Option<usize>) -> bool {
    max_other.map_or(true, |max| innovation > max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(innovations: &[usize]) -> NeatGenome {
        NeatGenome {
            nodes: Vec::new(),
            connections: innovations
                .iter()
                .map(|&i| NeatConnection {
                    from_node: i,
                    to_node: i + 100,
                    weight: i as f64,
                    enabled: true,
                    innovation: i,
                })
                .collect(),
        }
    }

    #[test]
    fn test_gene_beyond_other_max_is_excess() {
        let a = genome(&[0, 1, 2, 5]);
        let b = genome(&[0, 1, 2, 3]);
        let al = GeneAlignment::new(&a, &b);
        assert_eq!(al.matching.len(), 3);
        assert_eq!(al.excess_a.iter().map(|g| g.innovation).collect::<Vec<_>>(), vec![5]);
        assert!(al.disjoint_a.is_empty());
        assert_eq!(al.disjoint_b.iter().map(|g| g.innovation).collect::<Vec<_>>(), vec![3]);
        assert!(al.excess_b.is_empty());
    }

    #[test]
    fn test_interior_gaps_are_disjoint() {
        let a = genome(&[0, 2, 4, 9]);
        let b = genome(&[0, 1, 4, 6, 7]);
        let al = GeneAlignment::new(&a, &b);
        assert_eq!(al.matching.len(), 2);
        assert_eq!(al.disjoint_count(), 4);
        assert_eq!(al.excess_count(), 1);
    }

    #[test]
    fn test_empty_parent_makes_everything_excess() {
        let a = genome(&[]);
        let b = genome(&[0, 1]);
        let al = GeneAlignment::new(&a, &b);
        assert_eq!(al.excess_b.len(), 2);
        assert_eq!(al.disjoint_count(), 0);
        assert_eq!(al.mean_weight_difference(), 0.0);
    }
}

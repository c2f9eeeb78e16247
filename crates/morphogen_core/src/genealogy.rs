//! Parent links of every creature a run has produced.

use morphogen_data::CreatureGenome;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

/// Default node budget of ancestor queries.
pub const DEFAULT_ANCESTOR_BUDGET: usize = 1_000;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineageRecord {
    pub parents: Vec<Uuid>,
    pub birth_generation: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LineageIndex {
    records: HashMap<Uuid, LineageRecord>,
}

impl LineageIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a genome's parents. Survivors already present are left as
    /// they are.
    pub fn record(&mut self, genome: &CreatureGenome) {
        self.records.entry(genome.id).or_insert_with(|| LineageRecord {
            parents: genome.parent_ids.clone(),
            birth_generation: genome.birth_generation,
        });
    }

    pub fn record_all<'a, I: IntoIterator<Item = &'a CreatureGenome>>(&mut self, genomes: I) {
        for g in genomes {
            self.record(g);
        }
    }

    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<&LineageRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &LineageRecord)> {
        self.records.iter()
    }

    /// Breadth-first ancestors of `id`, nearest first, visiting at most
    /// `budget` ids. Each id is visited once, so corrupt parent links that
    /// loop back terminate.
    #[must_use]
    pub fn ancestors(&self, id: Uuid, budget: usize) -> Vec<Uuid> {
        let mut visited: HashSet<Uuid> = HashSet::from([id]);
        let mut queue: VecDeque<Uuid> = VecDeque::from([id]);
        let mut found = Vec::new();
        while let Some(current) = queue.pop_front() {
            let Some(record) = self.records.get(&current) else {
                continue;
            };
            for parent in &record.parents {
                if found.len() >= budget {
                    return found;
                }
                if visited.insert(*parent) {
                    found.push(*parent);
                    queue.push_back(*parent);
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphogen_data::{BodyGenome, Controller};

    fn genome(n: u128, parents: &[u128]) -> CreatureGenome {
        let mut g = CreatureGenome::founder(Uuid::from_u128(n), BodyGenome::default(), Controller::None);
        g.parent_ids = parents.iter().map(|&p| Uuid::from_u128(p)).collect();
        g
    }

    #[test]
    fn test_ancestors_breadth_first() {
        let mut index = LineageIndex::new();
        index.record_all(&[
            genome(1, &[]),
            genome(2, &[]),
            genome(3, &[1, 2]),
            genome(4, &[3]),
            genome(5, &[4, 1]),
        ]);
        let found = index.ancestors(Uuid::from_u128(5), DEFAULT_ANCESTOR_BUDGET);
        let expected: Vec<Uuid> = [4, 1, 3, 2].iter().map(|&n| Uuid::from_u128(n)).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_cycle_and_budget_terminate() {
        let mut index = LineageIndex::new();
        index.record_all(&[genome(1, &[2]), genome(2, &[1])]);
        assert_eq!(index.ancestors(Uuid::from_u128(1), 10), vec![Uuid::from_u128(2)]);

        let chain: Vec<CreatureGenome> = (1..50u128).map(|n| genome(n, &[n - 1])).collect();
        let mut index = LineageIndex::new();
        index.record_all(&chain);
        assert_eq!(index.ancestors(Uuid::from_u128(49), 5).len(), 5);
    }

    #[test]
    fn test_record_keeps_first_entry() {
        let mut index = LineageIndex::new();
        let mut g = genome(7, &[1]);
        index.record(&g);
        g.parent_ids.clear();
        index.record(&g);
        assert_eq!(index.get(&Uuid::from_u128(7)).unwrap().parents.len(), 1);
        assert_eq!(index.len(), 1);
    }
}

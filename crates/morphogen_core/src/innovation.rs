//! Historical markers for NEAT structural mutations.
//!
//! One registry lives for the whole run and is passed explicitly to every
//! operation that can add structure. Within a generation the same structural
//! event (same `(from, to)` pair, or a split of the same connection) always
//! maps to the same id, so sibling genomes that happen to make the same
//! mutation stay alignable. The caches are dropped between generations; the
//! counters never go backwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InnovationRegistry {
    #[serde(alias = "innovationCounterConnection")]
    next_connection: usize,
    #[serde(alias = "innovationCounterNode")]
    next_node: usize,
    #[serde(skip)]
    connection_cache: HashMap<(usize, usize), usize>,
    #[serde(skip)]
    node_cache: HashMap<usize, usize>,
}

impl InnovationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a registry from persisted counters with cold caches.
    #[must_use]
    pub fn from_counters(next_connection: usize, next_node: usize) -> Self {
        Self {
            next_connection,
            next_node,
            ..Self::default()
        }
    }

    /// Innovation id for a connection `from -> to`, allocating on first use
    /// this generation.
    pub fn connection_innovation(&mut self, from: usize, to: usize) -> usize {
        let next = &mut self.next_connection;
        *self.connection_cache.entry((from, to)).or_insert_with(|| {
            let id = *next;
            *next += 1;
            id
        })
    }

    /// Node innovation for splitting the connection with innovation
    /// `split_connection`, allocating on first use this generation.
    pub fn node_innovation(&mut self, split_connection: usize) -> usize {
        let next = &mut self.next_node;
        *self.node_cache.entry(split_connection).or_insert_with(|| {
            let id = *next;
            *next += 1;
            id
        })
    }

    /// Forgets this generation's events. Counters are untouched.
    pub fn clear_generation_cache(&mut self) {
        self.connection_cache.clear();
        self.node_cache.clear();
    }

    /// Next connection innovation that will be allocated.
    #[must_use]
    pub fn connection_counter(&self) -> usize {
        self.next_connection
    }

    /// Next node innovation that will be allocated.
    #[must_use]
    pub fn node_counter(&self) -> usize {
        self.next_node
    }

    /// Raises the counters past every id already present in `genomes`, so
    /// a registry rebuilt from stale counters never reissues a live id.
    pub fn reserve_past<'a, I>(&mut self, genomes: I)
    where
        I: IntoIterator<Item = &'a morphogen_data::NeatGenome>,
    {
        for g in genomes {
            if let Some(max) = g.max_innovation() {
                self.next_connection = self.next_connection.max(max + 1);
            }
            for n in &g.nodes {
                if let Some(inn) = n.innovation {
                    self.next_node = self.next_node.max(inn + 1);
                }
            }
        }
    }
}

use morphogen_core::genealogy::LineageIndex;
use morphogen_data::CreatureGenome;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A creature in the ancestry graph, living or not.
pub struct AncestryNode {
    pub id: Uuid,
    /// Short display label.
    pub name: String,
    pub birth_generation: u32,
    /// Whether the creature is in the current population.
    pub is_alive: bool,
}

/// Parent-to-child graph of every creature a run has recorded.
pub struct AncestryTree {
    pub graph: DiGraph<AncestryNode, ()>,
    id_map: HashMap<Uuid, NodeIndex>,
}

impl Default for AncestryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AncestryTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_map: HashMap::new(),
        }
    }

    /// Builds the full graph. Parents missing from `index` are left out.
    #[must_use]
    pub fn build(index: &LineageIndex, living: &[CreatureGenome]) -> Self {
        let ids: Vec<Uuid> = index.iter().map(|(id, _)| *id).collect();
        Self::build_from(index, living, ids)
    }

    /// Builds the graph of `id` and at most `budget` of its ancestors.
    #[must_use]
    pub fn build_ancestry(index: &LineageIndex, living: &[CreatureGenome], id: Uuid, budget: usize) -> Self {
        let mut ids = index.ancestors(id, budget);
        if index.get(&id).is_some() {
            ids.push(id);
        }
        Self::build_from(index, living, ids)
    }

    fn build_from(index: &LineageIndex, living: &[CreatureGenome], mut ids: Vec<Uuid>) -> Self {
        let alive: HashSet<Uuid> = living.iter().map(|g| g.id).collect();
        let mut tree = Self::new();

        ids.sort_by_key(|id| (index.get(id).map_or(0, |r| r.birth_generation), *id));
        ids.dedup();
        for id in &ids {
            let Some(record) = index.get(id) else {
                continue;
            };
            let idx = tree.graph.add_node(AncestryNode {
                id: *id,
                name: format!("C-{}", &id.simple().to_string()[..6]),
                birth_generation: record.birth_generation,
                is_alive: alive.contains(id),
            });
            tree.id_map.insert(*id, idx);
        }

        for id in &ids {
            let (Some(record), Some(&child)) = (index.get(id), tree.id_map.get(id)) else {
                continue;
            };
            for parent in &record.parents {
                if let Some(&p_idx) = tree.id_map.get(parent) {
                    tree.graph.update_edge(p_idx, child, ());
                }
            }
        }

        tree
    }

    #[must_use]
    pub fn node(&self, id: &Uuid) -> Option<&AncestryNode> {
        self.id_map.get(id).map(|&idx| &self.graph[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of recorded children of `id`.
    #[must_use]
    pub fn offspring_count(&self, id: &Uuid) -> usize {
        self.id_map.get(id).map_or(0, |&idx| {
            self.graph.neighbors_directed(idx, Direction::Outgoing).count()
        })
    }

    /// Creatures with no recorded parent.
    #[must_use]
    pub fn roots(&self) -> Vec<Uuid> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors_directed(idx, Direction::Incoming).next().is_none())
            .map(|idx| self.graph[idx].id)
            .collect()
    }

    /// Graphviz DOT rendering; living creatures are highlighted.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph Ancestry {\n");
        dot.push_str("  node [shape=box, style=filled, fontname=\"Arial\"];\n");

        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            let color = if node.is_alive { "#e1f5fe" } else { "#eeeeee" };
            let offspring = self.graph.neighbors_directed(idx, Direction::Outgoing).count();
            dot.push_str(&format!(
                "  \"{}\" [label=\"{} (Gen {})\\nOffspring: {}\", fillcolor=\"{}\"];\n",
                node.id, node.name, node.birth_generation, offspring, color
            ));
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\";\n",
                    self.graph[from].id, self.graph[to].id
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }
}

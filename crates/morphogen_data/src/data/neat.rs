use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Type of NEAT node.
#[derive(
    Clone,
    Copy,
    Debug,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Sensor node, fixed at genome creation.
    Input,
    /// Evolved node created by splitting a connection.
    Hidden,
    /// Actuator node, fixed at genome creation.
    Output,
}

/// A node gene.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct NeatNode {
    pub id: usize,
    #[serde(alias = "type", alias = "node_type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub bias: f64,
    /// Node innovation that created this node; hidden nodes only.
    #[serde(default)]
    pub innovation: Option<usize>,
}

fn default_enabled() -> bool {
    true
}

/// A connection gene.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct NeatConnection {
    #[serde(alias = "from", alias = "from_node")]
    pub from_node: usize,
    #[serde(alias = "to", alias = "to_node")]
    pub to_node: usize,
    pub weight: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Historical marker used to align genes across genomes.
    pub innovation: usize,
}

/// An evolvable-topology controller.
///
/// Input and output node ids are fixed at creation and shared by every
/// genome of a run, so genomes with different hidden structure can still be
/// aligned by innovation number.
#[derive(
    Clone, Debug, Default, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct NeatGenome {
    pub nodes: Vec<NeatNode>,
    #[serde(default)]
    pub connections: Vec<NeatConnection>,
}

impl NeatGenome {
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&NeatNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn has_node(&self, id: usize) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Whether a connection `from -> to` exists, enabled or not.
    #[must_use]
    pub fn has_connection(&self, from: usize, to: usize) -> bool {
        self.connections
            .iter()
            .any(|c| c.from_node == from && c.to_node == to)
    }

    #[must_use]
    pub fn count_of(&self, node_type: NodeType) -> usize {
        self.nodes.iter().filter(|n| n.node_type == node_type).count()
    }

    /// Number of input plus output nodes.
    #[must_use]
    pub fn io_count(&self) -> usize {
        self.count_of(NodeType::Input) + self.count_of(NodeType::Output)
    }

    #[must_use]
    pub fn enabled_connection_count(&self) -> usize {
        self.connections.iter().filter(|c| c.enabled).count()
    }

    /// Highest connection innovation, `None` without connections.
    #[must_use]
    pub fn max_innovation(&self) -> Option<usize> {
        self.connections.iter().map(|c| c.innovation).max()
    }

    /// Structural validity: endpoints exist and no `(from, to)` pair repeats.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let ids: HashSet<usize> = self.nodes.iter().map(|n| n.id).collect();
        if ids.len() != self.nodes.len() {
            return false;
        }
        let mut pairs = HashSet::new();
        self.connections.iter().all(|c| {
            ids.contains(&c.from_node)
                && ids.contains(&c.to_node)
                && pairs.insert((c.from_node, c.to_node))
        })
    }
}

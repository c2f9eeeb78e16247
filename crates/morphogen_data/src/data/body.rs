use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Node size used when a legacy payload omits it.
pub const DEFAULT_NODE_SIZE: f64 = 0.5;
/// Node mass used when a legacy payload omits it.
pub const DEFAULT_NODE_MASS: f64 = 1.0;
/// Surface friction used when a legacy payload omits it.
pub const DEFAULT_NODE_FRICTION: f64 = 0.5;
/// Bounciness used when a legacy payload omits it.
pub const DEFAULT_NODE_RESTITUTION: f64 = 0.2;
/// Spring stiffness used when a legacy payload omits it.
pub const DEFAULT_MUSCLE_STIFFNESS: f64 = 100.0;
/// Spring damping used when a legacy payload omits it.
pub const DEFAULT_MUSCLE_DAMPING: f64 = 0.5;
/// Oscillation frequency (Hz) used when a legacy payload omits it.
pub const DEFAULT_MUSCLE_FREQUENCY: f64 = 1.0;
/// Contraction amplitude used when a legacy payload omits it.
pub const DEFAULT_MUSCLE_AMPLITUDE: f64 = 0.3;

fn default_node_size() -> f64 {
    DEFAULT_NODE_SIZE
}
fn default_node_mass() -> f64 {
    DEFAULT_NODE_MASS
}
fn default_node_friction() -> f64 {
    DEFAULT_NODE_FRICTION
}
fn default_node_restitution() -> f64 {
    DEFAULT_NODE_RESTITUTION
}
fn default_muscle_stiffness() -> f64 {
    DEFAULT_MUSCLE_STIFFNESS
}
fn default_muscle_damping() -> f64 {
    DEFAULT_MUSCLE_DAMPING
}
fn default_muscle_frequency() -> f64 {
    DEFAULT_MUSCLE_FREQUENCY
}
fn default_muscle_amplitude() -> f64 {
    DEFAULT_MUSCLE_AMPLITUDE
}
fn default_multiplier() -> f64 {
    1.0
}

/// A point mass in the creature's body graph.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct BodyNode {
    /// Identifier unique within one body.
    pub id: usize,
    /// Spawn position `[x, y, z]`.
    pub position: [f64; 3],
    /// Collision radius.
    #[serde(default = "default_node_size")]
    pub size: f64,
    #[serde(default = "default_node_mass")]
    pub mass: f64,
    #[serde(default = "default_node_friction")]
    pub friction: f64,
    #[serde(default = "default_node_restitution")]
    pub restitution: f64,
}

/// An oscillating spring between two body nodes.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct Muscle {
    /// Identifier unique within one body.
    pub id: usize,
    #[serde(alias = "node_a")]
    pub node_a: usize,
    #[serde(alias = "node_b")]
    pub node_b: usize,
    /// Resting spring length. A non-positive value is recomputed from the
    /// endpoint distance during normalization.
    #[serde(default, alias = "rest_length")]
    pub rest_length: f64,
    #[serde(default = "default_muscle_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_muscle_damping")]
    pub damping: f64,
    #[serde(default = "default_muscle_frequency")]
    pub frequency: f64,
    #[serde(default = "default_muscle_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub phase: f64,
}

impl Muscle {
    /// Whether this muscle joins `a` and `b`, in either direction.
    #[must_use]
    pub fn joins(&self, a: usize, b: usize) -> bool {
        (self.node_a == a && self.node_b == b) || (self.node_a == b && self.node_b == a)
    }

    /// Endpoints as an ordered `(low, high)` pair.
    #[must_use]
    pub fn endpoints(&self) -> (usize, usize) {
        if self.node_a <= self.node_b {
            (self.node_a, self.node_b)
        } else {
            (self.node_b, self.node_a)
        }
    }
}

/// The physical half of a creature genome.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct BodyGenome {
    pub nodes: Vec<BodyNode>,
    #[serde(default)]
    pub muscles: Vec<Muscle>,
    #[serde(default = "default_multiplier", alias = "global_frequency_multiplier")]
    pub global_frequency_multiplier: f64,
    #[serde(default = "default_multiplier", alias = "global_amplitude_multiplier")]
    pub global_amplitude_multiplier: f64,
}

impl Default for BodyGenome {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            muscles: Vec::new(),
            global_frequency_multiplier: 1.0,
            global_amplitude_multiplier: 1.0,
        }
    }
}

impl BodyGenome {
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&BodyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn has_node(&self, id: usize) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Whether any muscle already joins `a` and `b`.
    #[must_use]
    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        self.muscles.iter().any(|m| m.joins(a, b))
    }

    /// Smallest id not used by any node.
    #[must_use]
    pub fn next_node_id(&self) -> usize {
        self.nodes.iter().map(|n| n.id + 1).max().unwrap_or(0)
    }

    /// Smallest id not used by any muscle.
    #[must_use]
    pub fn next_muscle_id(&self) -> usize {
        self.muscles.iter().map(|m| m.id + 1).max().unwrap_or(0)
    }

    /// Euclidean distance between two nodes, if both exist.
    #[must_use]
    pub fn node_distance(&self, a: usize, b: usize) -> Option<f64> {
        let pa = self.node(a)?.position;
        let pb = self.node(b)?.position;
        let d2: f64 = pa.iter().zip(pb.iter()).map(|(x, y)| (x - y).powi(2)).sum();
        Some(d2.sqrt())
    }

    /// Every muscle references two distinct existing nodes.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.muscles
            .iter()
            .all(|m| m.node_a != m.node_b && self.has_node(m.node_a) && self.has_node(m.node_b))
    }
}

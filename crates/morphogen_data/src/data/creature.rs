use super::body::BodyGenome;
use super::neat::NeatGenome;
use super::neural::NeuralGenome;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which controller a genome carries, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    None,
    Fixed,
    Neat,
}

/// The controller half of a creature genome.
#[derive(
    Clone, Debug, Default, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Controller {
    /// Muscles run open-loop on their own oscillators.
    #[default]
    None,
    /// Fixed-topology dense network.
    Fixed(NeuralGenome),
    /// Evolvable-topology network.
    Neat(NeatGenome),
}

impl Controller {
    #[must_use]
    pub fn kind(&self) -> ControllerKind {
        match self {
            Controller::None => ControllerKind::None,
            Controller::Fixed(_) => ControllerKind::Fixed,
            Controller::Neat(_) => ControllerKind::Neat,
        }
    }

    #[must_use]
    pub fn as_neat(&self) -> Option<&NeatGenome> {
        match self {
            Controller::Neat(g) => Some(g),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_fixed(&self) -> Option<&NeuralGenome> {
        match self {
            Controller::Fixed(g) => Some(g),
            _ => None,
        }
    }
}

/// A complete creature: identity, body and controller.
#[derive(
    Clone, Debug, Serialize, Deserialize, PartialEq, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct CreatureGenome {
    pub id: Uuid,
    #[serde(default, alias = "parent_ids")]
    pub parent_ids: Vec<Uuid>,
    /// Consecutive generations this identity has survived selection.
    #[serde(default, alias = "survival_streak")]
    pub survival_streak: u32,
    #[serde(default, alias = "birth_generation", alias = "generation")]
    pub birth_generation: u32,
    pub body: BodyGenome,
    #[serde(default)]
    pub controller: Controller,
}

impl CreatureGenome {
    /// A first-generation genome with no parents.
    #[must_use]
    pub fn founder(id: Uuid, body: BodyGenome, controller: Controller) -> Self {
        Self {
            id,
            parent_ids: Vec::new(),
            survival_streak: 0,
            birth_generation: 0,
            body,
            controller,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.body.nodes.len()
    }

    #[must_use]
    pub fn muscle_count(&self) -> usize {
        self.body.muscles.len()
    }

    #[must_use]
    pub fn controller_kind(&self) -> ControllerKind {
        self.controller.kind()
    }

    /// Serialize genome to hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(bytes)
    }

    /// Deserialize genome from hex string.
    pub fn from_hex(hex_str: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(hex_str)?;
        let genome = serde_json::from_slice(&bytes)?;
        Ok(genome)
    }
}

//! # Morphogen Data
//!
//! Plain value types shared by every Morphogen crate: creature genomes (body
//! graph plus controller), population statistics and evaluator results.
//!
//! Nothing here mutates or evolves a genome; the engine lives in
//! `morphogen_core`. The only behavior is accessors and the legacy
//! normalization adapter applied at the data boundary.

pub mod data;

pub use data::body::{BodyGenome, BodyNode, Muscle};
pub use data::creature::{Controller, ControllerKind, CreatureGenome};
pub use data::neat::{NeatConnection, NeatGenome, NeatNode, NodeType};
pub use data::neural::NeuralGenome;
pub use data::normalize::RepairReport;
pub use data::stats::{FitnessResult, PopulationStats};

//! Core data structures for Morphogen genomes.

pub mod body;
pub mod creature;
pub mod neat;
pub mod neural;
pub mod normalize;
pub mod stats;

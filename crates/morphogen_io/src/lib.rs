//! # Morphogen IO
//!
//! Persistence boundary for Morphogen runs.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - Validated JSON and HexDNA serialization, with genome import repair
//! - Run checkpoints (gzip JSON) and population snapshots (rkyv)
//! - A per-generation history log with content digests
//! - Ancestry graph export

/// Error types and result aliases for I/O operations
pub mod error;
/// Generation history log and its digest
pub mod history;
/// Ancestry graph built from a lineage index
pub mod lineage;
/// Run checkpoints and population snapshots
pub mod persistence;
/// Validated serialization helpers for JSON and HexDNA formats
pub mod serialization;

pub use error::{IoError, Result};
pub use serialization::{
    from_hex_dna, from_json, import_genome, import_genomes, is_valid_hex_dna, read_json_file,
    to_hex_dna, to_json, to_json_pretty, validate_json, write_json_file,
};

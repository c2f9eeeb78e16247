//! Serialization helpers with validation.
//!
//! JSON is the interchange format; HexDNA is the same JSON Base16-encoded so
//! a genome can be pasted as a single token.

use crate::error::{IoError, Result};
use morphogen_data::{CreatureGenome, RepairReport};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes from JSON, rejecting blank input up front.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

pub fn validate_json<T>(json: &str) -> Result<()>
where
    T: for<'de> Deserialize<'de>,
{
    let _: T = from_json(json)?;
    Ok(())
}

pub fn to_hex_dna<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    let json = to_json(data)?;
    Ok(hex::encode(json.as_bytes()))
}

pub fn from_hex_dna<T>(hex_str: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let hex_str = hex_str.trim();
    if hex_str.is_empty() {
        return Err(IoError::validation("Empty hex string"));
    }

    let bytes = hex::decode(hex_str)
        .map_err(|e| IoError::validation(format!("Invalid hex encoding: {}", e)))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| IoError::validation(format!("Invalid UTF-8 in hex: {}", e)))?;

    from_json(&json)
}

#[must_use]
pub fn is_valid_hex_dna(hex_str: &str) -> bool {
    let hex_str = hex_str.trim();
    !hex_str.is_empty() && hex::decode(hex_str).is_ok()
}

/// Parses one genome from JSON or HexDNA and repairs legacy values.
///
/// Missing fields are already defaulted by serde; the returned report lists
/// what normalization had to fix on top of that.
pub fn import_genome(text: &str) -> Result<(CreatureGenome, RepairReport)> {
    let trimmed = text.trim();
    let mut genome: CreatureGenome = if trimmed.starts_with('{') {
        from_json(trimmed)?
    } else {
        from_hex_dna(trimmed)?
    };
    let report = genome.normalize();
    if !report.is_clean() {
        tracing::debug!(id = %genome.id, ?report, "Imported genome repaired");
    }
    Ok((genome, report))
}

/// Parses a JSON array of genomes, normalizing each.
pub fn import_genomes(json: &str) -> Result<Vec<CreatureGenome>> {
    let mut genomes: Vec<CreatureGenome> = from_json(json)?;
    let repaired = genomes
        .iter_mut()
        .map(CreatureGenome::normalize)
        .filter(|r| !r.is_clean())
        .count();
    if repaired > 0 {
        tracing::debug!(repaired, total = genomes.len(), "Imported genomes repaired");
    }
    Ok(genomes)
}

pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    std::fs::write(&path, json).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing JSON to {:?}", path.as_ref()))
    })?;
    Ok(())
}

pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading JSON from {:?}", path.as_ref()))
    })?;
    from_json(&json)
}

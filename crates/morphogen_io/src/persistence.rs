//! Run checkpoints and population snapshots.
//!
//! Checkpoints are gzip-compressed JSON of a [`RunState`] so they stay
//! inspectable with standard tools. Snapshots are rkyv archives of one
//! generation, validated on load.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use morphogen_core::run::RunState;
use morphogen_data::{CreatureGenome, PopulationStats};
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{Archive, Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// One generation frozen for later analysis.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct PopulationSnapshot {
    pub generation: u32,
    pub genomes: Vec<CreatureGenome>,
    pub stats: Option<PopulationStats>,
}

/// Writes `state` as gzip JSON.
pub fn save_run_state<P: AsRef<Path>>(state: &RunState, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| IoError::from(e).with_context(format!("creating checkpoint {:?}", path)))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    let json = serde_json::to_vec(state)?;
    encoder
        .write_all(&json)
        .map_err(|e| IoError::compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| IoError::compression(e.to_string()))?;
    tracing::debug!(?path, generation = state.generation, "Checkpoint saved");
    Ok(())
}

/// Reads a checkpoint written by [`save_run_state`].
///
/// `path` may omit the `.gz` suffix. Uncompressed JSON is accepted too.
pub fn load_run_state<P: AsRef<Path>>(path: P) -> Result<RunState> {
    let target = resolve_checkpoint(path.as_ref())?;
    let raw = std::fs::read(&target)
        .map_err(|e| IoError::from(e).with_context(format!("reading checkpoint {:?}", target)))?;

    let mut decoded = Vec::new();
    let bytes = if GzDecoder::new(raw.as_slice()).read_to_end(&mut decoded).is_ok() {
        decoded
    } else {
        raw
    };
    let state: RunState = serde_json::from_slice(&bytes)?;
    Ok(state)
}

fn resolve_checkpoint(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let mut gz = path.as_os_str().to_owned();
    gz.push(".gz");
    let gz = PathBuf::from(gz);
    if gz.exists() {
        Ok(gz)
    } else {
        Err(IoError::not_found(path.display().to_string()))
    }
}

pub fn save_rkyv<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize<AllocSerializer<4096>>,
    P: AsRef<Path>,
{
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(data)
        .map_err(|e| IoError::rkyv(format!("serialization failed: {:?}", e)))?;
    let bytes = serializer.into_serializer().into_inner();
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

pub fn load_rkyv<T, P>(path: P) -> Result<T>
where
    T: Archive,
    T::Archived: Deserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
    P: AsRef<Path>,
{
    let raw = std::fs::read(path)?;
    let mut bytes = rkyv::AlignedVec::with_capacity(raw.len());
    bytes.extend_from_slice(&raw);
    let archived = rkyv::check_archived_root::<T>(&bytes)
        .map_err(|e| IoError::rkyv(format!("validation failed: {:?}", e)))?;
    let mut deserializer = SharedDeserializeMap::default();
    archived
        .deserialize(&mut deserializer)
        .map_err(|e| IoError::rkyv(format!("deserialization failed: {:?}", e)))
}

pub fn save_snapshot<P: AsRef<Path>>(snapshot: &PopulationSnapshot, path: P) -> Result<()> {
    save_rkyv(snapshot, path)
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<PopulationSnapshot> {
    load_rkyv(path)
}

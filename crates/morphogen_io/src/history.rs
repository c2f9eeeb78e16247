//! Append-only run history.
//!
//! Each line of `history.jsonl` is one [`HistoryEvent`]. Generation events
//! carry a SHA-256 digest of the population they produced so a snapshot can
//! later be matched to its log entry.

use crate::error::Result;
use chrono::{DateTime, Utc};
use morphogen_data::{CreatureGenome, PopulationStats};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const HISTORY_FILE: &str = "history.jsonl";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HistoryEvent {
    #[serde(rename_all = "camelCase")]
    RunStarted {
        timestamp: DateTime<Utc>,
        seed: u64,
        population_size: usize,
    },
    #[serde(rename_all = "camelCase")]
    Generation {
        timestamp: DateTime<Utc>,
        stats: PopulationStats,
        digest: String,
    },
    #[serde(rename_all = "camelCase")]
    Checkpoint {
        timestamp: DateTime<Utc>,
        generation: u32,
        path: String,
    },
}

/// Hex SHA-256 of the population's JSON encoding.
pub fn population_digest(genomes: &[CreatureGenome]) -> Result<String> {
    let json = serde_json::to_string(genomes)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

pub struct HistoryLogger {
    file: Option<BufWriter<File>>,
    path: PathBuf,
}

impl HistoryLogger {
    /// Opens `dir/history.jsonl` for appending, creating `dir` if needed.
    pub fn new_at<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        let path = dir.join(HISTORY_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Some(BufWriter::new(file)),
            path,
        })
    }

    /// A logger that discards everything.
    #[must_use]
    pub fn new_dummy() -> Self {
        Self {
            file: None,
            path: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log_event(&mut self, event: &HistoryEvent) -> Result<()> {
        if let Some(ref mut file) = self.file {
            let json = serde_json::to_string(event)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        }
        Ok(())
    }

    pub fn log_run_started(&mut self, seed: u64, population_size: usize) -> Result<()> {
        self.log_event(&HistoryEvent::RunStarted {
            timestamp: Utc::now(),
            seed,
            population_size,
        })
    }

    /// Logs `stats` together with the digest of `population`, the genomes
    /// the generation produced.
    pub fn log_generation(&mut self, stats: &PopulationStats, population: &[CreatureGenome]) -> Result<()> {
        let digest = population_digest(population)?;
        self.log_event(&HistoryEvent::Generation {
            timestamp: Utc::now(),
            stats: stats.clone(),
            digest,
        })
    }

    pub fn log_checkpoint(&mut self, generation: u32, path: &Path) -> Result<()> {
        self.log_event(&HistoryEvent::Checkpoint {
            timestamp: Utc::now(),
            generation,
            path: path.display().to_string(),
        })
    }
}

/// Reads every parseable event from a history file. A missing file reads
/// as empty; malformed lines are skipped.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<Vec<HistoryEvent>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let reader = BufReader::new(file);
    let mut events = Vec::new();
    for line in reader.lines().map_while(std::result::Result::ok) {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HistoryEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => tracing::warn!(error = %e, "Skipping malformed history line"),
        }
    }
    Ok(events)
}

/// Generation stats in log order.
pub fn read_generations<P: AsRef<Path>>(path: P) -> Result<Vec<PopulationStats>> {
    Ok(read_events(path)?
        .into_iter()
        .filter_map(|e| match e {
            HistoryEvent::Generation { stats, .. } => Some(stats),
            _ => None,
        })
        .collect())
}

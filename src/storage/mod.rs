//! Replay store on the local filesystem.
//!
//! Each team's replays live in one JSONL file:
//! `<data_dir>/replays/<team_id>.jsonl`.

mod jsonl;

pub use jsonl::*;

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Replay, TeamId};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid team id: {0:?}")]
    InvalidTeamId(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn replays_dir(&self) -> PathBuf {
        self.data_dir.join("replays")
    }

    /// Path of a team's replay file. Team ids are restricted to `[A-Za-z0-9_-]`.
    pub fn team_path(&self, team_id: &TeamId) -> Result<PathBuf, StorageError> {
        let id = team_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidTeamId(id.to_string()));
        }
        Ok(self.replays_dir().join(format!("{}.jsonl", id)))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// All stored replays for a team, in file order. A team with no file has no replays.
pub fn load_team_replays(
    config: &StorageConfig,
    team_id: &TeamId,
) -> Result<Vec<Replay>, StorageError> {
    JsonlReader::<Replay>::new(config.team_path(team_id)?).read_all()
}

/// Append replays not already stored for the team. Returns how many were written.
///
/// Replays without an id get one derived from their URL; replays with neither are skipped.
pub fn import_team_replays(
    config: &StorageConfig,
    team_id: &TeamId,
    replays: Vec<Replay>,
) -> Result<usize, StorageError> {
    let path = config.team_path(team_id)?;
    let existing = JsonlReader::<Replay>::new(path.clone()).read_all()?;
    let mut seen: HashSet<String> = existing.iter().map(|r| r.id.to_string()).collect();

    let offered = replays.len();
    let fresh: Vec<Replay> = replays
        .into_iter()
        .filter_map(|mut r| {
            if r.ensure_id() {
                Some(r)
            } else {
                warn!("Skipping replay with neither id nor url");
                None
            }
        })
        .filter(|r| seen.insert(r.id.to_string()))
        .collect();

    let written = JsonlWriter::new(path).append_batch(&fresh)?;
    info!(
        "Imported {} of {} replays for team {}",
        written, offered, team_id
    );
    Ok(written)
}

/// Team ids that have a replay file, sorted.
pub fn list_teams(config: &StorageConfig) -> Result<Vec<TeamId>, StorageError> {
    let dir = config.replays_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut teams = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            teams.push(TeamId::from(stem));
        }
    }

    teams.sort();
    Ok(teams)
}

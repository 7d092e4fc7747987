//! One JSON file per username under the configured save directory.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::shared::*;

pub const SAVE_VERSION: u32 = 1;
pub const SAVE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("username cannot be empty")]
    EmptyUsername,
    #[error("username '{0}' may only contain letters, digits, spaces, '-' and '_'")]
    InvalidUsername(String),
    #[error("account with username {0} already exists")]
    AccountExists(String),
    #[error("account with username {0} does not exist")]
    AccountMissing(String),
    #[error("no account loaded to save")]
    NoActiveAccount,
    #[error("I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save data for {username} is unreadable: {source}")]
    Serde {
        username: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Whole-state snapshot of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub version: u32,
    pub username: String,
    pub level: u32,
    pub score: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub completed_tasks: Vec<FarmingTask>,
    /// Incomplete tasks only.
    pub active_tasks: Vec<FarmingTask>,
    pub human_form_unlocked: bool,
    pub game_time_secs: f64,
    pub save_timestamp: u64,
}

impl PlayerData {
    pub fn capture(
        username: &str,
        progression: &Progression,
        board: &TaskBoard,
        game_time_secs: f64,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            username: username.to_string(),
            level: progression.level,
            score: progression.score,
            experience: progression.experience,
            experience_to_next: progression.experience_to_next,
            completed_tasks: board.completed.clone(),
            active_tasks: board
                .active
                .iter()
                .filter(|t| !t.completed)
                .cloned()
                .collect(),
            human_form_unlocked: progression.human_form_unlocked(),
            game_time_secs,
            save_timestamp: current_timestamp(),
        }
    }

    pub fn progression(&self) -> Progression {
        Progression {
            score: self.score,
            level: self.level,
            experience: self.experience,
            experience_to_next: self.experience_to_next,
        }
    }

    pub fn task_board(&self, catalog: &[TaskDef]) -> TaskBoard {
        TaskBoard::from_snapshot(
            catalog,
            self.active_tasks.clone(),
            self.completed_tasks.clone(),
        )
    }
}

/// Usernames double as file names.
pub fn validate_username(username: &str) -> Result<(), SaveError> {
    if username.trim().is_empty() {
        return Err(SaveError::EmptyUsername);
    }
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'));
    if !allowed {
        return Err(SaveError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", username, SAVE_EXTENSION))
    }

    pub fn exists(&self, username: &str) -> bool {
        validate_username(username).is_ok() && self.slot_path(username).is_file()
    }

    /// Overwrite the slot for `data.username`.
    pub fn save(&self, data: &PlayerData) -> Result<(), SaveError> {
        validate_username(&data.username)?;
        fs::create_dir_all(&self.dir).map_err(|source| SaveError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(data).map_err(|source| SaveError::Serde {
            username: data.username.clone(),
            source,
        })?;

        let path = self.slot_path(&data.username);
        // Write to a temp file first, then rename for atomicity
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).map_err(|source| SaveError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| SaveError::Io { path, source })?;
        Ok(())
    }

    pub fn load(&self, username: &str) -> Result<PlayerData, SaveError> {
        validate_username(username)?;
        let path = self.slot_path(username);
        if !path.is_file() {
            return Err(SaveError::AccountMissing(username.to_string()));
        }

        let json = fs::read_to_string(&path).map_err(|source| SaveError::Io {
            path: path.clone(),
            source,
        })?;
        let data: PlayerData = serde_json::from_str(&json).map_err(|source| SaveError::Serde {
            username: username.to_string(),
            source,
        })?;

        if data.version != SAVE_VERSION {
            warn!(
                "[Save] {} has version {} but current version is {}. Attempting to load anyway.",
                username, data.version, SAVE_VERSION
            );
        }
        Ok(data)
    }

    /// Returns whether a file was actually removed.
    pub fn delete(&self, username: &str) -> Result<bool, SaveError> {
        validate_username(username)?;
        let path = self.slot_path(username);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| SaveError::Io { path, source })?;
        Ok(true)
    }

    /// Usernames with a save file, sorted.
    pub fn list(&self) -> Result<Vec<String>, SaveError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SaveError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(SAVE_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }
}

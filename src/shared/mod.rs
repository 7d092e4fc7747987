//! Shared resources, events, and states for Greenacre.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    /// Login / account selection. No account is loaded yet.
    MainMenu,
    Playing,
    Paused,
}

/// Per-frame order of the domain systems in `Update`.
///
/// Events flow downstream within one frame: accounts start or load a game,
/// crops report farming actions, tasks turn them into score and experience,
/// progression applies those, and persistence saves the result.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    Accounts,
    Crops,
    Tasks,
    Progression,
    Persist,
}

/// Chains the `GameSet` stages. Each plugin calls this so it can also be
/// added on its own.
pub fn configure_game_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameSet::Accounts,
            GameSet::Crops,
            GameSet::Tasks,
            GameSet::Progression,
            GameSet::Persist,
        )
            .chain(),
    );
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const STARTING_LEVEL: u32 = 1;
pub const STARTING_EXPERIENCE_THRESHOLD: u32 = 100;
/// Score awarded per unit of task progress, on top of completion rewards.
pub const SCORE_PER_PROGRESS: u32 = 10;
/// Reaching this level unlocks the human transformation.
pub const HUMAN_FORM_LEVEL: u32 = 10;

// ═══════════════════════════════════════════════════════════════════════
// PROGRESSION
// ═══════════════════════════════════════════════════════════════════════

/// Score / level / experience triple. Persisted in save files.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub score: u32,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            score: 0,
            level: STARTING_LEVEL,
            experience: 0,
            experience_to_next: STARTING_EXPERIENCE_THRESHOLD,
        }
    }
}

impl Progression {
    /// Score never decreases; overflow saturates.
    pub fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    /// Accumulate experience and level up as many times as it pays for.
    /// Returns every level reached, in order (empty if no level-up).
    pub fn add_experience(&mut self, amount: u32) -> Vec<u32> {
        self.experience = self.experience.saturating_add(amount);

        let mut reached = Vec::new();
        // A zero threshold (hand-edited save) would never terminate.
        if self.experience_to_next == 0 {
            self.experience_to_next = 1;
        }
        while self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.level += 1;
            self.experience_to_next = next_threshold(self.experience_to_next);
            reached.push(self.level);
        }
        reached
    }

    pub fn human_form_unlocked(&self) -> bool {
        self.level >= HUMAN_FORM_LEVEL
    }
}

/// Threshold for the level after one with `current`: ×1.2 rounded to the
/// nearest integer, and always strictly larger.
pub fn next_threshold(current: u32) -> u32 {
    // round(current * 6 / 5) without floats; 6x/5 never lands on .5
    let scaled = (current as u64 * 12 + 5) / 10;
    let scaled = scaled.min(u32::MAX as u64) as u32;
    scaled.max(current.saturating_add(1))
}

// ═══════════════════════════════════════════════════════════════════════
// TASKS
// ═══════════════════════════════════════════════════════════════════════

/// A countable farming objective with a reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmingTask {
    pub name: String,
    pub description: String,
    pub target: u32,
    pub current: u32,
    pub reward: u32,
    pub completed: bool,
    pub visible: bool,
}

impl FarmingTask {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        target: u32,
        reward: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            // A zero target would be "done" before any progress could be recorded.
            target: target.max(1),
            current: 0,
            reward,
            completed: false,
            visible: true,
        }
    }

    /// Add progress, clamped to the target. Returns true only on the call
    /// that completes the task.
    pub fn increment_progress(&mut self, amount: u32) -> bool {
        if self.completed {
            return false;
        }
        self.current = self.current.saturating_add(amount).min(self.target);
        if self.current >= self.target {
            self.completed = true;
            return true;
        }
        false
    }

    /// Fraction done in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.target == 0 {
            return 0.0;
        }
        self.current as f32 / self.target as f32
    }

    /// Case-insensitive substring match against the task name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// All farming tasks the player knows about.
///
/// `available` is the pool of tasks not started yet, `active` holds started
/// tasks that are still in progress, `completed` holds finished ones in
/// completion order.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskBoard {
    pub available: Vec<FarmingTask>,
    pub active: Vec<FarmingTask>,
    pub completed: Vec<FarmingTask>,
}

impl TaskBoard {
    /// First active task whose name contains `query` (case-insensitive).
    pub fn active_task(&self, query: &str) -> Option<&FarmingTask> {
        self.active.iter().find(|t| t.name_matches(query))
    }

    pub fn completed(&self) -> &[FarmingTask] {
        &self.completed
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.active
            .iter()
            .chain(self.completed.iter())
            .any(|t| t.name == name)
    }

    /// Rebuild a board from saved task lists. Catalog tasks the player has
    /// already seen are left out of the available pool.
    pub fn from_snapshot(
        catalog: &[TaskDef],
        active: Vec<FarmingTask>,
        completed: Vec<FarmingTask>,
    ) -> Self {
        let mut board = TaskBoard {
            available: Vec::new(),
            active: Vec::new(),
            completed,
        };
        for task in active {
            if task.completed {
                board.completed.push(task);
            } else {
                board.active.push(task);
            }
        }
        board.available = catalog
            .iter()
            .filter(|def| !board.is_known(&def.name))
            .map(TaskDef::to_task)
            .collect();
        board
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DATA DEFINITIONS (populated by DataPlugin)
// ═══════════════════════════════════════════════════════════════════════

/// A task the game seeds into a fresh board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    pub name: String,
    pub description: String,
    pub target: u32,
    pub reward: u32,
}

impl TaskDef {
    pub fn to_task(&self) -> FarmingTask {
        FarmingTask::new(
            self.name.clone(),
            self.description.clone(),
            self.target,
            self.reward,
        )
    }
}

/// Template pool used when the catalog runs dry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomTaskTemplates {
    pub verbs: Vec<String>,
    pub objects: Vec<String>,
    /// Inclusive bounds.
    pub target_range: (u32, u32),
    /// Inclusive bounds.
    pub reward_range: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDef {
    pub crop_type: String,
    pub growth_secs: f32,
    pub wither_secs: f32,
    pub harvest_value: u32,
    pub growth_stages: u8,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CropRegistry {
    pub crops: HashMap<String, CropDef>,
}

/// Tunables loaded from `config/greenacre.ron`.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub save_dir: PathBuf,
    pub autosave_enabled: bool,
    pub autosave_interval_secs: f32,
    pub starting_tasks: Vec<TaskDef>,
    pub random_tasks: RandomTaskTemplates,
    pub crops: Vec<CropDef>,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Some farming action happened; credit the first matching active task.
#[derive(Event, Debug, Clone)]
pub struct TaskProgressEvent {
    pub task_name: String,
    pub amount: u32,
}

#[derive(Event, Debug, Clone)]
pub struct TaskStartedEvent {
    pub task_name: String,
    pub description: String,
}

#[derive(Event, Debug, Clone)]
pub struct TaskCompletedEvent {
    pub task_name: String,
    pub reward: u32,
}

#[derive(Event, Debug, Clone)]
pub struct ScoreChangeEvent {
    pub amount: u32,
    pub reason: String,
}

#[derive(Event, Debug, Clone)]
pub struct ExperienceGainEvent {
    pub amount: u32,
}

/// One per level crossed.
#[derive(Event, Debug, Clone)]
pub struct LevelUpEvent {
    pub new_level: u32,
}

/// Plant a crop of the given registered type.
#[derive(Event, Debug, Clone)]
pub struct PlantCropEvent {
    pub crop_type: String,
}

/// The player interacted with a crop (water / harvest / remove).
#[derive(Event, Debug, Clone)]
pub struct CropInteractEvent {
    pub crop: Entity,
}

/// External trigger (drought, pests, weather) that withers a crop.
#[derive(Event, Debug, Clone)]
pub struct WitherCropEvent {
    pub crop: Entity,
}

#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub crop_type: String,
    pub value: u32,
}

/// Reset progression and tasks to a fresh game.
#[derive(Event, Debug, Clone)]
pub struct NewGameEvent {
    pub username: String,
}

/// Toggle between Playing and Paused.
#[derive(Event, Debug, Clone)]
pub struct TogglePauseEvent;

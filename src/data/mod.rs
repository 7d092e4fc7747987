//! Data layer: loads tunables and populates registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), reads
//! `config/greenacre.ron` (or the file named by `GREENACRE_CONFIG`), falls
//! back to the hard-coded game-design data in submodules when the file is
//! missing or invalid, fills the CropRegistry, then transitions the game
//! into GameState::MainMenu.

mod crops;
mod tasks;

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::*;

pub use crops::default_crops;
pub use tasks::{default_random_templates, default_starting_tasks};

pub const CONFIG_PATH: &str = "config/greenacre.ron";
pub const CONFIG_PATH_ENV: &str = "GREENACRE_CONFIG";

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<CropRegistry>()
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            autosave_enabled: true,
            autosave_interval_secs: 60.0,
            starting_tasks: default_starting_tasks(),
            random_tasks: default_random_templates(),
            crops: default_crops(),
        }
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH))
}

/// Read and validate a RON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<GameConfig, String> {
    let data = fs::read_to_string(&path).map_err(|err| format!("unable to read file: {err}"))?;
    parse_config(&data)
}

pub fn parse_config(data: &str) -> Result<GameConfig, String> {
    let config: GameConfig =
        ron::from_str(data).map_err(|err| format!("invalid game config: {err}"))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.autosave_interval_secs <= 0.0 {
        return Err("autosave_interval_secs must be positive".to_string());
    }

    let templates = &config.random_tasks;
    if templates.verbs.is_empty() || templates.objects.is_empty() {
        return Err("random_tasks needs at least one verb and one object".to_string());
    }
    if templates.target_range.0 == 0 || templates.target_range.0 > templates.target_range.1 {
        return Err(format!(
            "random_tasks.target_range {:?} must be non-empty and start above 0",
            templates.target_range
        ));
    }
    if templates.reward_range.0 > templates.reward_range.1 {
        return Err(format!(
            "random_tasks.reward_range {:?} is empty",
            templates.reward_range
        ));
    }

    for task in &config.starting_tasks {
        if task.name.trim().is_empty() {
            return Err("starting task name cannot be empty".to_string());
        }
        if task.target == 0 {
            return Err(format!("starting task '{}' needs a target above 0", task.name));
        }
    }

    for crop in &config.crops {
        if crop.crop_type.trim().is_empty() {
            return Err("crop_type cannot be empty".to_string());
        }
        if crop.growth_secs <= 0.0 || crop.wither_secs <= 0.0 {
            return Err(format!(
                "crop '{}' needs positive growth and wither durations",
                crop.crop_type
            ));
        }
        if crop.growth_stages == 0 {
            return Err(format!("crop '{}' needs at least one stage", crop.crop_type));
        }
    }

    Ok(())
}

pub fn populate_crops(registry: &mut CropRegistry, config: &GameConfig) {
    registry.crops.clear();
    for def in &config.crops {
        registry.crops.insert(def.crop_type.clone(), def.clone());
    }
}

/// Single system that loads the config, populates the crop registry, and
/// transitions to MainMenu.
fn load_all_data(
    mut config: ResMut<GameConfig>,
    mut crop_registry: ResMut<CropRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let path = config_path();
    info!("[Data] Loading config from {}…", path.display());

    match load_config(&path) {
        Ok(loaded) => {
            *config = loaded;
            info!("[Data] Config loaded.");
        }
        Err(e) => {
            warn!(
                "[Data] Could not use {} ({}). Falling back to built-in defaults.",
                path.display(),
                e
            );
            *config = GameConfig::default();
        }
    }

    populate_crops(&mut crop_registry, &config);
    info!(
        "[Data] Starting tasks: {}, crop types: {}",
        config.starting_tasks.len(),
        crop_registry.crops.len()
    );

    next_state.set(GameState::MainMenu);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GameConfig::default()).is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = parse_config("(autosave_enabled: false, save_dir: \"elsewhere\")").unwrap();
        assert!(!config.autosave_enabled);
        assert_eq!(config.save_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.starting_tasks, default_starting_tasks());
        assert_eq!(config.autosave_interval_secs, 60.0);
    }

    #[test]
    fn test_rejects_empty_target_range() {
        let err = parse_config(
            "(random_tasks: (verbs: [\"Plant\"], objects: [\"Corn\"], target_range: (5, 2), reward_range: (30, 69)))",
        )
        .unwrap_err();
        assert!(err.contains("target_range"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_config("not ron at all {").is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_PATH);
        let config = load_config(path).expect("shipped config should be valid");
        assert_eq!(config.starting_tasks.len(), 5);
        assert!(!config.crops.is_empty());
    }

    #[test]
    fn test_populate_crops_keys_by_type() {
        let mut registry = CropRegistry::default();
        populate_crops(&mut registry, &GameConfig::default());
        assert!(registry.crops.contains_key("Carrots"));
        assert_eq!(registry.crops.len(), default_crops().len());
    }
}

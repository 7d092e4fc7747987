//! Greenacre library crate: the headless core of a farming game.
//!
//! Farming tasks, score/level progression, crop growth, and per-user save
//! slots, each as a Bevy plugin. Rendering, input, audio and UI live outside
//! this crate and talk to it through the events in `shared` and `save`.
//! The binary crate (`main.rs`) runs the same plugins without a window, and
//! `tests/` drives them with `MinimalPlugins`.

pub mod shared;
pub mod data;
pub mod tasks;
pub mod progression;
pub mod crops;
pub mod save;

use bevy::prelude::*;

use shared::*;

/// Every domain plugin plus the top-level game state.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_event::<TogglePauseEvent>()
            // Data loading
            .add_plugins(data::DataPlugin)
            // Domain plugins
            .add_plugins(tasks::TasksPlugin)
            .add_plugins(progression::ProgressionPlugin)
            .add_plugins(crops::CropsPlugin)
            .add_plugins(save::SavePlugin)
            .add_systems(
                Update,
                handle_toggle_pause
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
            );
    }
}

/// Flips between Playing and Paused once per pair of requests.
pub fn handle_toggle_pause(
    mut events: EventReader<TogglePauseEvent>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let requests = events.read().count();
    if requests % 2 == 0 {
        return;
    }
    match state.get() {
        GameState::Playing => {
            info!("Game paused");
            next_state.set(GameState::Paused);
        }
        GameState::Paused => {
            info!("Game resumed");
            next_state.set(GameState::Playing);
        }
        _ => {}
    }
}

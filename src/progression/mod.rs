//! Progression domain: score, level, experience, and level-up thresholds.
//!
//! Score and experience arrive as events from any domain; this module is the
//! only writer of the `Progression` resource during play.

use bevy::prelude::*;

use crate::shared::*;

pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        configure_game_sets(app);
        app.init_resource::<Progression>()
            .add_event::<ScoreChangeEvent>()
            .add_event::<ExperienceGainEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<NewGameEvent>()
            .add_systems(
                Update,
                reset_on_new_game
                    .before(apply_score_changes)
                    .before(apply_experience)
                    .in_set(GameSet::Progression),
            )
            // Rewards sent in the frame that pauses still land.
            .add_systems(
                Update,
                (
                    apply_score_changes,
                    apply_experience,
                    announce_level_ups.after(apply_experience),
                )
                    .in_set(GameSet::Progression)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
            );
    }
}

/// Applies ScoreChangeEvents to `Progression::score`.
pub fn apply_score_changes(
    mut events: EventReader<ScoreChangeEvent>,
    mut progression: ResMut<Progression>,
) {
    for ev in events.read() {
        progression.add_score(ev.amount);
        info!(
            "[Progression] Score +{}: {}. Total: {}",
            ev.amount, ev.reason, progression.score
        );
    }
}

/// Applies ExperienceGainEvents, emitting one LevelUpEvent per level crossed.
pub fn apply_experience(
    mut events: EventReader<ExperienceGainEvent>,
    mut progression: ResMut<Progression>,
    mut level_writer: EventWriter<LevelUpEvent>,
) {
    for ev in events.read() {
        for new_level in progression.add_experience(ev.amount) {
            level_writer.send(LevelUpEvent { new_level });
        }
    }
}

pub fn announce_level_ups(mut events: EventReader<LevelUpEvent>) {
    for ev in events.read() {
        info!("[Progression] LEVEL UP! Reached level {}", ev.new_level);
        if ev.new_level == HUMAN_FORM_LEVEL {
            info!(
                "[Progression] Level {} reached. Human transformation unlocked!",
                HUMAN_FORM_LEVEL
            );
        }
    }
}

pub fn reset_on_new_game(
    mut events: EventReader<NewGameEvent>,
    mut progression: ResMut<Progression>,
) {
    for _ev in events.read() {
        *progression = Progression::default();
    }
}

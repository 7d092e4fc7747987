//! Task domain: farming tasks, progress counters, and reward dispatch.
//!
//! Other domains report farming actions with `TaskProgressEvent`; this
//! module credits the matching task, pays out score and experience through
//! `ScoreChangeEvent` / `ExperienceGainEvent`, and keeps a task active.

use bevy::prelude::*;

use crate::shared::*;

pub mod tracker;

use tracker::{complete_and_advance, completion_rewards, record_progress, seed_board, start_next_task};

pub struct TasksPlugin;

impl Plugin for TasksPlugin {
    fn build(&self, app: &mut App) {
        configure_game_sets(app);
        app.init_resource::<TaskBoard>()
            .init_resource::<GameConfig>()
            .add_event::<TaskProgressEvent>()
            .add_event::<TaskStartedEvent>()
            .add_event::<TaskCompletedEvent>()
            .add_event::<ScoreChangeEvent>()
            .add_event::<ExperienceGainEvent>()
            .add_event::<NewGameEvent>()
            // New games can start from the main menu.
            .add_systems(Update, handle_new_game.in_set(GameSet::Tasks))
            .add_systems(
                Update,
                (
                    handle_task_progress.after(handle_new_game),
                    ensure_active_task
                        .after(handle_task_progress)
                        .after(handle_new_game),
                    log_task_started.after(ensure_active_task),
                )
                    .in_set(GameSet::Tasks)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System: handle_new_game
// ─────────────────────────────────────────────────────────────────────────────

/// Re-seeds the board from the catalog when a new game begins.
pub fn handle_new_game(
    mut events: EventReader<NewGameEvent>,
    mut board: ResMut<TaskBoard>,
    config: Res<GameConfig>,
    mut started_writer: EventWriter<TaskStartedEvent>,
) {
    for ev in events.read() {
        info!("[Tasks] Seeding task board for {}", ev.username);
        if let Some(task) = seed_board(&mut board, &config.starting_tasks) {
            started_writer.send(TaskStartedEvent {
                task_name: task.name,
                description: task.description,
            });
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System: handle_task_progress
// ─────────────────────────────────────────────────────────────────────────────

/// Credits progress to the first matching active task. Every unit of
/// progress is worth `SCORE_PER_PROGRESS`; completing a task pays its reward
/// as score and half of it as experience, then starts the next task.
pub fn handle_task_progress(
    mut events: EventReader<TaskProgressEvent>,
    mut board: ResMut<TaskBoard>,
    config: Res<GameConfig>,
    mut score_writer: EventWriter<ScoreChangeEvent>,
    mut xp_writer: EventWriter<ExperienceGainEvent>,
    mut completed_writer: EventWriter<TaskCompletedEvent>,
    mut started_writer: EventWriter<TaskStartedEvent>,
) {
    let mut rng = rand::thread_rng();

    for ev in events.read() {
        let Some(outcome) = record_progress(&mut board, &ev.task_name, ev.amount) else {
            debug!("[Tasks] No active task matches '{}'", ev.task_name);
            continue;
        };

        score_writer.send(ScoreChangeEvent {
            amount: ev.amount.saturating_mul(SCORE_PER_PROGRESS),
            reason: format!("Progress on {}", outcome.task_name),
        });

        if !outcome.completed {
            info!(
                "[Tasks] Task progress: {} {}/{}",
                outcome.task_name, outcome.current, outcome.target
            );
            continue;
        }

        let Some(advance) = complete_and_advance(
            &mut board,
            &outcome.task_name,
            &config.random_tasks,
            &mut rng,
        ) else {
            continue;
        };

        let (score, experience) = completion_rewards(&advance.finished);
        info!(
            "[Tasks] Completed task: {} +{} points!",
            advance.finished.name, score
        );
        score_writer.send(ScoreChangeEvent {
            amount: score,
            reason: format!("Completed {}", advance.finished.name),
        });
        xp_writer.send(ExperienceGainEvent { amount: experience });
        completed_writer.send(TaskCompletedEvent {
            task_name: advance.finished.name.clone(),
            reward: advance.finished.reward,
        });

        match advance.started {
            Some(task) => {
                started_writer.send(TaskStartedEvent {
                    task_name: task.name,
                    description: task.description,
                });
            }
            None => warn!("[Tasks] No follow-up task could be started"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System: ensure_active_task
// ─────────────────────────────────────────────────────────────────────────────

/// A loaded save (or an empty catalog) can leave nothing active; hand out
/// the next task so progress always has somewhere to go.
pub fn ensure_active_task(
    mut board: ResMut<TaskBoard>,
    config: Res<GameConfig>,
    mut started_writer: EventWriter<TaskStartedEvent>,
) {
    if !board.active.is_empty() {
        return;
    }
    let mut rng = rand::thread_rng();
    if let Some(task) = start_next_task(&mut board, &config.random_tasks, &mut rng) {
        started_writer.send(TaskStartedEvent {
            task_name: task.name,
            description: task.description,
        });
    }
}

/// Logs each newly started task.
pub fn log_task_started(mut events: EventReader<TaskStartedEvent>) {
    for ev in events.read() {
        info!("[Tasks] NEW TASK: {} - {}", ev.task_name, ev.description);
    }
}

//! Task board operations: starting, progress lookup, completion and advancing.
//!
//! Everything here is a plain function over `TaskBoard` so it can be driven
//! from systems and from tests alike.

use rand::Rng;

use crate::shared::*;

/// Result of crediting progress to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOutcome {
    pub task_name: String,
    pub current: u32,
    pub target: u32,
    /// True only on the update that finished the task.
    pub completed: bool,
}

/// Result of retiring a finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub finished: FarmingTask,
    /// Task that was started in its place, if any could be.
    pub started: Option<FarmingTask>,
}

/// Clear the board and offer the catalog again, starting the first task.
/// Returns the task that was started.
pub fn seed_board(board: &mut TaskBoard, catalog: &[TaskDef]) -> Option<FarmingTask> {
    *board = TaskBoard {
        available: catalog.iter().map(TaskDef::to_task).collect(),
        ..Default::default()
    };

    let first = board.available.first().cloned()?;
    if start_task(board, first.clone()) {
        Some(first)
    } else {
        None
    }
}

/// Move `task` onto the active list. Refused when a task with the same name
/// is already active.
pub fn start_task(board: &mut TaskBoard, task: FarmingTask) -> bool {
    if board.active.iter().any(|t| t.name == task.name) {
        return false;
    }
    board.available.retain(|t| t.name != task.name);
    board.active.push(task);
    true
}

/// Credit `amount` to the first active, incomplete task whose name contains
/// `query` (case-insensitive). Returns `None` if nothing matches.
pub fn record_progress(board: &mut TaskBoard, query: &str, amount: u32) -> Option<ProgressOutcome> {
    let task = board
        .active
        .iter_mut()
        .find(|t| !t.completed && t.name_matches(query))?;

    let completed = task.increment_progress(amount);
    Some(ProgressOutcome {
        task_name: task.name.clone(),
        current: task.current,
        target: task.target,
        completed,
    })
}

/// Score and experience paid out for finishing `task`.
pub fn completion_rewards(task: &FarmingTask) -> (u32, u32) {
    (task.reward, task.reward / 2)
}

/// Retire the finished task named `task_name` and start the next one.
/// Returns `None` if no completed task by that name is active.
pub fn complete_and_advance(
    board: &mut TaskBoard,
    task_name: &str,
    templates: &RandomTaskTemplates,
    rng: &mut impl Rng,
) -> Option<Advance> {
    let idx = board
        .active
        .iter()
        .position(|t| t.name == task_name && t.completed)?;
    let finished = board.active.remove(idx);
    board.completed.push(finished.clone());

    let started = start_next_task(board, templates, rng);
    Some(Advance { finished, started })
}

/// Start the next unseen catalog task, or synthesize a random one when the
/// catalog is exhausted.
pub fn start_next_task(
    board: &mut TaskBoard,
    templates: &RandomTaskTemplates,
    rng: &mut impl Rng,
) -> Option<FarmingTask> {
    let next = board
        .available
        .iter()
        .find(|t| t.visible && !t.completed && !board.is_known(&t.name))
        .cloned();

    let task = match next {
        Some(task) => task,
        None => random_task(board, templates, rng)?,
    };

    if start_task(board, task.clone()) {
        Some(task)
    } else {
        None
    }
}

/// Build a task like "Water 4 Corn" from the template pool, avoiding names
/// that are currently active.
pub fn random_task(
    board: &TaskBoard,
    templates: &RandomTaskTemplates,
    rng: &mut impl Rng,
) -> Option<FarmingTask> {
    if templates.verbs.is_empty() || templates.objects.is_empty() {
        return None;
    }

    for _ in 0..8 {
        let verb = &templates.verbs[rng.gen_range(0..templates.verbs.len())];
        let object = &templates.objects[rng.gen_range(0..templates.objects.len())];
        let (min_target, max_target) = templates.target_range;
        let target = rng.gen_range(min_target.max(1)..=max_target.max(min_target.max(1)));
        let (min_reward, max_reward) = templates.reward_range;
        let reward = rng.gen_range(min_reward..=max_reward.max(min_reward));

        let name = format!("{} {} {}", verb, target, object);
        if board.active.iter().any(|t| t.name == name) {
            continue;
        }
        let description = format!("Complete the farming task: {}", name);
        return Some(FarmingTask::new(name, description, target, reward));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{default_random_templates, default_starting_tasks};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_board() -> TaskBoard {
        let mut board = TaskBoard::default();
        seed_board(&mut board, &default_starting_tasks());
        board
    }

    #[test]
    fn test_seed_starts_first_catalog_task() {
        let board = seeded_board();
        assert_eq!(board.active.len(), 1);
        assert_eq!(board.active[0].name, "Plant 5 Crops");
        assert_eq!(board.available.len(), 4);
        assert!(board.available.iter().all(|t| t.name != "Plant 5 Crops"));
    }

    #[test]
    fn test_start_task_refuses_duplicate_active_name() {
        let mut board = seeded_board();
        let dup = FarmingTask::new("Plant 5 Crops", "again", 5, 50);
        assert!(!start_task(&mut board, dup));
        assert_eq!(board.active.len(), 1);
    }

    #[test]
    fn test_record_progress_is_case_insensitive_substring() {
        let mut board = seeded_board();
        let outcome = record_progress(&mut board, "PLANT", 2).unwrap();
        assert_eq!(outcome.task_name, "Plant 5 Crops");
        assert_eq!(outcome.current, 2);
        assert_eq!(outcome.target, 5);
        assert!(!outcome.completed);
    }

    #[test]
    fn test_record_progress_without_match_is_none() {
        let mut board = seeded_board();
        assert!(record_progress(&mut board, "milk", 1).is_none());
        assert_eq!(board.active[0].current, 0);
    }

    #[test]
    fn test_first_match_wins() {
        let mut board = seeded_board();
        start_task(&mut board, FarmingTask::new("Plant 3 Corn", "", 3, 40));
        let outcome = record_progress(&mut board, "plant", 1).unwrap();
        assert_eq!(outcome.task_name, "Plant 5 Crops");
        assert_eq!(board.active[1].current, 0);
    }

    #[test]
    fn test_progress_clamps_to_target() {
        let mut board = seeded_board();
        let outcome = record_progress(&mut board, "plant", 50).unwrap();
        assert_eq!(outcome.current, 5);
        assert!(outcome.completed);
        assert!(board.active[0].current <= board.active[0].target);
        assert!(board.active[0].completed);
    }

    #[test]
    fn test_completed_task_no_longer_matches() {
        let mut board = seeded_board();
        record_progress(&mut board, "plant", 5).unwrap();
        assert!(record_progress(&mut board, "plant", 1).is_none());
    }

    #[test]
    fn test_complete_and_advance_picks_next_catalog_task() {
        let mut board = seeded_board();
        let mut rng = StdRng::seed_from_u64(7);
        record_progress(&mut board, "plant", 5).unwrap();

        let advance =
            complete_and_advance(&mut board, "Plant 5 Crops", &default_random_templates(), &mut rng)
                .unwrap();
        assert_eq!(advance.finished.name, "Plant 5 Crops");
        assert_eq!(advance.started.unwrap().name, "Harvest 3 Crops");
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.active.len(), 1);
        assert_eq!(board.active[0].name, "Harvest 3 Crops");
    }

    #[test]
    fn test_complete_and_advance_ignores_unfinished_task() {
        let mut board = seeded_board();
        let mut rng = StdRng::seed_from_u64(7);
        record_progress(&mut board, "plant", 1).unwrap();
        assert!(
            complete_and_advance(&mut board, "Plant 5 Crops", &default_random_templates(), &mut rng)
                .is_none()
        );
        assert_eq!(board.active.len(), 1);
    }

    #[test]
    fn test_hidden_tasks_are_skipped() {
        let mut board = seeded_board();
        board.available[0].visible = false; // Harvest 3 Crops
        let mut rng = StdRng::seed_from_u64(1);
        let started = start_next_task(&mut board, &default_random_templates(), &mut rng).unwrap();
        assert_eq!(started.name, "Water 10 Plants");
    }

    #[test]
    fn test_exhausted_catalog_synthesizes_random_task() {
        let mut board = TaskBoard::default();
        let templates = default_random_templates();
        let mut rng = StdRng::seed_from_u64(42);

        let started = start_next_task(&mut board, &templates, &mut rng).unwrap();
        assert!(started.target >= 3 && started.target <= 7);
        assert!(started.reward >= 30 && started.reward <= 69);
        assert!(templates.verbs.iter().any(|v| started.name.starts_with(v.as_str())));
        assert!(templates.objects.iter().any(|o| started.name.ends_with(o.as_str())));
        assert_eq!(
            started.description,
            format!("Complete the farming task: {}", started.name)
        );
        assert_eq!(board.active.len(), 1);
    }

    #[test]
    fn test_completion_rewards_half_as_experience() {
        let task = FarmingTask::new("Milk Cows", "Milk 3 cows", 3, 75);
        assert_eq!(completion_rewards(&task), (75, 37));
    }

    #[test]
    fn test_full_catalog_walkthrough_keeps_invariants() {
        let mut board = seeded_board();
        let templates = default_random_templates();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..12 {
            let name = board.active[0].name.clone();
            let target = board.active[0].target;
            let outcome = record_progress(&mut board, &name, target + 3).unwrap();
            assert!(outcome.completed);
            complete_and_advance(&mut board, &name, &templates, &mut rng).unwrap();

            for task in board.active.iter().chain(board.completed.iter()) {
                assert!(task.current <= task.target);
                assert_eq!(task.completed, task.current == task.target);
            }
        }
        assert_eq!(board.completed.len(), 12);
        assert!(board.available.is_empty());
    }
}

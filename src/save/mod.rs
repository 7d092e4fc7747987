//! Accounts and save/load: one save slot per username.
//!
//! UI and input live outside this crate; they drive accounts with the events
//! below and learn the outcome from `AccountResultEvent`, which carries a
//! success flag and, on failure, the logged error message.

use bevy::prelude::*;

use crate::shared::*;

pub mod store;

pub use store::{validate_username, PlayerData, SaveError, SaveStore, SAVE_VERSION};

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct CreateAccountEvent {
    pub username: String,
}

/// Load an existing account and start playing it.
#[derive(Event, Debug, Clone)]
pub struct LoginEvent {
    pub username: String,
}

/// Save the logged-in account now.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

#[derive(Event, Debug, Clone)]
pub struct DeleteAccountEvent {
    pub username: String,
}

#[derive(Event, Debug, Clone)]
pub struct LogoutEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    Create,
    Login,
    Save,
    Delete,
    Logout,
}

/// Sent once per account request, success or failure.
#[derive(Event, Debug, Clone)]
pub struct AccountResultEvent {
    pub action: AccountAction,
    pub username: String,
    pub success: bool,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// The logged-in account, if any, and its accumulated play time.
#[derive(Resource, Debug, Clone, Default)]
pub struct AccountSession {
    pub username: Option<String>,
    pub play_time_secs: f64,
}

impl AccountSession {
    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }
}

/// Usernames with a save file, refreshed whenever the main menu opens.
#[derive(Resource, Debug, Clone, Default)]
pub struct SavedAccounts {
    pub usernames: Vec<String>,
}

#[derive(Resource, Debug, Clone)]
pub struct AutosaveTimer {
    pub timer: Timer,
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(60.0, TimerMode::Repeating),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        configure_game_sets(app);
        app.init_resource::<GameConfig>()
            .init_resource::<AccountSession>()
            .init_resource::<SavedAccounts>()
            .init_resource::<AutosaveTimer>()
            .add_event::<CreateAccountEvent>()
            .add_event::<LoginEvent>()
            .add_event::<SaveRequestEvent>()
            .add_event::<DeleteAccountEvent>()
            .add_event::<LogoutEvent>()
            .add_event::<AccountResultEvent>()
            .add_event::<NewGameEvent>()
            .add_systems(OnEnter(GameState::MainMenu), scan_saved_accounts)
            .add_systems(
                Update,
                (handle_create_account, handle_login, handle_delete_account)
                    .in_set(GameSet::Accounts)
                    .run_if(in_state(GameState::MainMenu)),
            )
            // Snapshots are taken after this frame's rewards are applied.
            .add_systems(
                Update,
                (tick_session_timer, autosave)
                    .before(handle_save_request)
                    .in_set(GameSet::Persist)
                    .run_if(in_state(GameState::Playing)),
            )
            // Saving and logging out also work from the pause menu.
            .add_systems(
                Update,
                (handle_save_request, handle_logout.after(handle_save_request))
                    .in_set(GameSet::Persist)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Paused))),
            );
    }
}

fn report(
    writer: &mut EventWriter<AccountResultEvent>,
    action: AccountAction,
    username: &str,
    result: Result<(), SaveError>,
) {
    let error_message = match result {
        Ok(()) => {
            writer.send(AccountResultEvent {
                action,
                username: username.to_string(),
                success: true,
                error_message: None,
            });
            return;
        }
        Err(e) => e.to_string(),
    };
    warn!("[Save] {:?} for '{}' FAILED: {}", action, username, error_message);
    writer.send(AccountResultEvent {
        action,
        username: username.to_string(),
        success: false,
        error_message: Some(error_message),
    });
}

fn store_for(config: &GameConfig) -> SaveStore {
    SaveStore::new(config.save_dir.clone())
}

fn reset_autosave(autosave: &mut AutosaveTimer, config: &GameConfig) {
    autosave.timer = Timer::from_seconds(config.autosave_interval_secs.max(1.0), TimerMode::Repeating);
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn scan_saved_accounts(config: Res<GameConfig>, mut accounts: ResMut<SavedAccounts>) {
    match store_for(&config).list() {
        Ok(names) => {
            info!("[Save] Found {} saved account(s).", names.len());
            accounts.usernames = names;
        }
        Err(e) => {
            warn!("[Save] Could not list saved accounts: {}", e);
            accounts.usernames.clear();
        }
    }
}

/// Creates a new account: refuses duplicates, writes the first save slot,
/// resets the game, and starts playing.
pub fn handle_create_account(
    mut events: EventReader<CreateAccountEvent>,
    mut results: EventWriter<AccountResultEvent>,
    mut new_game: EventWriter<NewGameEvent>,
    mut session: ResMut<AccountSession>,
    mut accounts: ResMut<SavedAccounts>,
    mut autosave: ResMut<AutosaveTimer>,
    mut next_state: ResMut<NextState<GameState>>,
    config: Res<GameConfig>,
) {
    for ev in events.read() {
        let store = store_for(&config);
        let username = ev.username.trim();

        let result = validate_username(username).and_then(|()| {
            if store.exists(username) {
                return Err(SaveError::AccountExists(username.to_string()));
            }
            let fresh = PlayerData::capture(
                username,
                &Progression::default(),
                &TaskBoard::default(),
                0.0,
            );
            store.save(&fresh)
        });

        if result.is_ok() {
            info!("[Save] Account created for: {}", username);
            session.username = Some(username.to_string());
            session.play_time_secs = 0.0;
            reset_autosave(&mut autosave, &config);
            if !accounts.usernames.iter().any(|n| n == username) {
                accounts.usernames.push(username.to_string());
                accounts.usernames.sort();
            }
            new_game.send(NewGameEvent {
                username: username.to_string(),
            });
            next_state.set(GameState::Playing);
        }
        report(&mut results, AccountAction::Create, username, result);
    }
}

/// Loads an account's save slot over the current progression and tasks.
pub fn handle_login(
    mut events: EventReader<LoginEvent>,
    mut results: EventWriter<AccountResultEvent>,
    mut session: ResMut<AccountSession>,
    mut progression: ResMut<Progression>,
    mut board: ResMut<TaskBoard>,
    mut autosave: ResMut<AutosaveTimer>,
    mut next_state: ResMut<NextState<GameState>>,
    config: Res<GameConfig>,
) {
    for ev in events.read() {
        let username = ev.username.trim();
        info!("[Save] Loading account {}...", username);

        let result = store_for(&config).load(username).map(|data| {
            *progression = data.progression();
            *board = data.task_board(&config.starting_tasks);
            session.username = Some(username.to_string());
            session.play_time_secs = data.game_time_secs;
            reset_autosave(&mut autosave, &config);
            next_state.set(GameState::Playing);
            info!(
                "[Save] Account loaded for: {} (level {}, score {})",
                username, progression.level, progression.score
            );
        });
        report(&mut results, AccountAction::Login, username, result);
    }
}

pub fn handle_save_request(
    mut events: EventReader<SaveRequestEvent>,
    mut results: EventWriter<AccountResultEvent>,
    session: Res<AccountSession>,
    progression: Res<Progression>,
    board: Res<TaskBoard>,
    config: Res<GameConfig>,
) {
    for _ev in events.read() {
        save_session(&mut results, &session, &progression, &board, &config);
    }
}

fn save_session(
    results: &mut EventWriter<AccountResultEvent>,
    session: &AccountSession,
    progression: &Progression,
    board: &TaskBoard,
    config: &GameConfig,
) {
    let Some(username) = session.username.as_deref() else {
        report(results, AccountAction::Save, "", Err(SaveError::NoActiveAccount));
        return;
    };

    let data = PlayerData::capture(username, progression, board, session.play_time_secs);
    let result = store_for(config).save(&data);
    if result.is_ok() {
        info!("[Save] Game saved for: {}", username);
    }
    report(results, AccountAction::Save, username, result);
}

pub fn handle_delete_account(
    mut events: EventReader<DeleteAccountEvent>,
    mut results: EventWriter<AccountResultEvent>,
    mut accounts: ResMut<SavedAccounts>,
    config: Res<GameConfig>,
) {
    for ev in events.read() {
        let username = ev.username.trim();
        let result = store_for(&config).delete(username).map(|removed| {
            if removed {
                info!("[Save] Account deleted: {}", username);
            } else {
                info!("[Save] No save file for {}, nothing to delete", username);
            }
            accounts.usernames.retain(|n| n != username);
        });
        report(&mut results, AccountAction::Delete, username, result);
    }
}

/// Autosaves (when enabled), clears the session, and returns to the menu.
pub fn handle_logout(
    mut events: EventReader<LogoutEvent>,
    mut results: EventWriter<AccountResultEvent>,
    mut session: ResMut<AccountSession>,
    progression: Res<Progression>,
    board: Res<TaskBoard>,
    config: Res<GameConfig>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for _ev in events.read() {
        let Some(username) = session.username.clone() else {
            report(&mut results, AccountAction::Logout, "", Err(SaveError::NoActiveAccount));
            continue;
        };
        if config.autosave_enabled {
            save_session(&mut results, &session, &progression, &board, &config);
        }
        *session = AccountSession::default();
        next_state.set(GameState::MainMenu);
        info!("[Save] User logged out");
        report(&mut results, AccountAction::Logout, &username, Ok(()));
    }
}

fn tick_session_timer(time: Res<Time>, mut session: ResMut<AccountSession>) {
    if session.is_logged_in() {
        session.play_time_secs += time.delta_secs_f64();
    }
}

fn autosave(
    time: Res<Time>,
    config: Res<GameConfig>,
    session: Res<AccountSession>,
    mut autosave: ResMut<AutosaveTimer>,
    mut save_writer: EventWriter<SaveRequestEvent>,
) {
    if !config.autosave_enabled || !session.is_logged_in() {
        return;
    }
    autosave.timer.tick(time.delta());
    if autosave.timer.just_finished() {
        info!("[Save] Autosaving");
        save_writer.send(SaveRequestEvent);
    }
}

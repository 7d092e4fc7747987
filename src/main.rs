use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

use greenacre::save::{scan_saved_accounts, CreateAccountEvent, LoginEvent, SavedAccounts};
use greenacre::shared::GameState;
use greenacre::GamePlugin;

/// Account to sign into at the main menu, when set.
const USER_ENV: &str = "GREENACRE_USER";

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        .add_plugins(GamePlugin)
        .add_systems(
            OnEnter(GameState::MainMenu),
            auto_login.after(scan_saved_accounts),
        )
        .run();
}

/// Headless stand-in for the login screen: signs into (or creates) the
/// account named by `GREENACRE_USER`.
fn auto_login(
    accounts: Res<SavedAccounts>,
    mut login: EventWriter<LoginEvent>,
    mut create: EventWriter<CreateAccountEvent>,
) {
    let Ok(username) = std::env::var(USER_ENV) else {
        info!("{} not set; waiting at the main menu.", USER_ENV);
        return;
    };

    if accounts.usernames.iter().any(|n| *n == username) {
        login.send(LoginEvent { username });
    } else {
        create.send(CreateAccountEvent { username });
    }
}

//! Crop domain: planting, timed growth, watering, harvest, withering.
//!
//! Communicates with other domains exclusively through crate::shared events/resources.
//! Each crop is an entity carrying a `Crop` component; timers only advance
//! while the game is Playing.

use bevy::prelude::*;

use crate::shared::*;

pub mod lifecycle;

pub use lifecycle::{Crop, CropAction, CropState, CropTick};

pub struct CropsPlugin;

impl Plugin for CropsPlugin {
    fn build(&self, app: &mut App) {
        configure_game_sets(app);
        app.init_resource::<CropRegistry>()
            .add_event::<PlantCropEvent>()
            .add_event::<CropInteractEvent>()
            .add_event::<WitherCropEvent>()
            .add_event::<CropHarvestedEvent>()
            .add_event::<TaskProgressEvent>()
            .add_event::<ScoreChangeEvent>()
            .add_event::<NewGameEvent>()
            // Leaving a session (logout) always passes through the menu.
            .add_systems(OnEnter(GameState::MainMenu), clear_crops)
            .add_systems(Update, clear_crops_on_new_game.in_set(GameSet::Crops))
            .add_systems(
                Update,
                (
                    handle_plant_crop.after(clear_crops_on_new_game),
                    handle_wither_crop,
                    handle_crop_interaction.after(handle_wither_crop),
                    tick_crops.after(handle_crop_interaction),
                )
                    .in_set(GameSet::Crops)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field reset
// ─────────────────────────────────────────────────────────────────────────────

/// Despawns every crop. Crops belong to the session that planted them.
pub fn clear_crops(mut commands: Commands, crops: Query<Entity, With<Crop>>) {
    let mut cleared = 0;
    for entity in crops.iter() {
        commands.entity(entity).despawn();
        cleared += 1;
    }
    if cleared > 0 {
        info!("[Crops] Cleared {} crop(s) from the field", cleared);
    }
}

pub fn clear_crops_on_new_game(
    mut events: EventReader<NewGameEvent>,
    commands: Commands,
    crops: Query<Entity, With<Crop>>,
) {
    if events.read().count() == 0 {
        return;
    }
    clear_crops(commands, crops);
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

/// Spawns a crop entity for each PlantCropEvent with a registered crop type.
pub fn handle_plant_crop(
    mut commands: Commands,
    mut plant_events: EventReader<PlantCropEvent>,
    crop_registry: Res<CropRegistry>,
    mut progress_writer: EventWriter<TaskProgressEvent>,
) {
    for ev in plant_events.read() {
        let Some(def) = crop_registry.crops.get(&ev.crop_type) else {
            warn!("[Crops] Unknown crop type '{}', nothing planted", ev.crop_type);
            continue;
        };

        commands.spawn(Crop::from_def(def));
        info!("[Crops] Planted {}", def.crop_type);
        progress_writer.send(TaskProgressEvent {
            task_name: "plant".to_string(),
            amount: 1,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interaction
// ─────────────────────────────────────────────────────────────────────────────

/// Water, harvest, or clear a crop depending on its state.
pub fn handle_crop_interaction(
    mut commands: Commands,
    mut interact_events: EventReader<CropInteractEvent>,
    mut crops: Query<&mut Crop>,
    mut progress_writer: EventWriter<TaskProgressEvent>,
    mut score_writer: EventWriter<ScoreChangeEvent>,
    mut harvest_writer: EventWriter<CropHarvestedEvent>,
) {
    for ev in interact_events.read() {
        let Ok(mut crop) = crops.get_mut(ev.crop) else {
            continue;
        };

        match crop.interact() {
            CropAction::Watered => {
                info!("[Crops] Watered the {} crop", crop.crop_type);
                progress_writer.send(TaskProgressEvent {
                    task_name: "water".to_string(),
                    amount: 1,
                });
            }
            CropAction::Harvested(value) => {
                info!("[Crops] Harvested {} crop for {} points", crop.crop_type, value);
                score_writer.send(ScoreChangeEvent {
                    amount: value,
                    reason: format!("Harvested {}", crop.crop_type),
                });
                harvest_writer.send(CropHarvestedEvent {
                    crop_type: crop.crop_type.clone(),
                    value,
                });
                progress_writer.send(TaskProgressEvent {
                    task_name: "harvest".to_string(),
                    amount: 1,
                });
                commands.entity(ev.crop).despawn();
            }
            CropAction::Cleared => {
                info!("[Crops] Removed withered {} crop", crop.crop_type);
                commands.entity(ev.crop).despawn();
            }
            CropAction::Nothing => {}
        }
    }
}

pub fn handle_wither_crop(
    mut wither_events: EventReader<WitherCropEvent>,
    mut crops: Query<&mut Crop>,
) {
    for ev in wither_events.read() {
        if let Ok(mut crop) = crops.get_mut(ev.crop) {
            if crop.wither() {
                info!("[Crops] The {} crop withered", crop.crop_type);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth
// ─────────────────────────────────────────────────────────────────────────────

/// Advances every crop's timers by the frame delta; despawns withered crops
/// whose time is up.
pub fn tick_crops(
    mut commands: Commands,
    time: Res<Time>,
    mut crops: Query<(Entity, &mut Crop)>,
) {
    let dt = time.delta_secs();
    for (entity, mut crop) in crops.iter_mut() {
        // Harvested / cleared this frame; despawn is already queued.
        if crop.state() == CropState::Removed {
            continue;
        }
        match crop.tick(dt) {
            CropTick::Ripened => {
                info!("[Crops] {} crop is ready to harvest", crop.crop_type);
            }
            CropTick::Expired => {
                info!("[Crops] Withered {} crop rotted away", crop.crop_type);
                commands.entity(entity).despawn();
            }
            CropTick::Stage(_) | CropTick::Unchanged => {}
        }
    }
}

//! Per-crop timed state machine.
//!
//! Planted → Growing (watered) → ReadyToHarvest (timer) → Removed (harvested).
//! Any live crop can be withered from outside; a withered crop is removed
//! after its wither duration or when the player clears it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::CropDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropState {
    Planted,
    Growing,
    ReadyToHarvest,
    Withered,
    /// Terminal. The entity is despawned the frame this is reached.
    Removed,
}

/// What a frame of growth did to a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropTick {
    Unchanged,
    /// Visual stage advanced to the given index.
    Stage(u8),
    Ripened,
    /// Withered long enough to disappear.
    Expired,
}

/// Outcome of the player's interact action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAction {
    Watered,
    Nothing,
    Harvested(u32),
    Cleared,
}

#[derive(Component, Debug, Clone)]
pub struct Crop {
    pub crop_type: String,
    pub growth_duration: f32,
    pub wither_duration: f32,
    pub harvest_value: u32,
    pub growth_stages: u8,
    state: CropState,
    growth_timer: f32,
    wither_timer: f32,
    stage: u8,
}

impl Crop {
    pub fn from_def(def: &CropDef) -> Self {
        Self {
            crop_type: def.crop_type.clone(),
            growth_duration: def.growth_secs,
            wither_duration: def.wither_secs,
            harvest_value: def.harvest_value,
            growth_stages: def.growth_stages.max(1),
            state: CropState::Planted,
            growth_timer: 0.0,
            wither_timer: 0.0,
            stage: 0,
        }
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    pub fn growth_timer(&self) -> f32 {
        self.growth_timer
    }

    pub fn wither_timer(&self) -> f32 {
        self.wither_timer
    }

    /// Visual growth stage index, `0..growth_stages`.
    pub fn stage(&self) -> u8 {
        self.stage
    }

    fn last_stage(&self) -> u8 {
        self.growth_stages.saturating_sub(1)
    }

    fn transition(&mut self, to: CropState) {
        self.state = to;
        self.growth_timer = 0.0;
        self.wither_timer = 0.0;
    }

    /// Planted → Growing. Returns false in any other state.
    pub fn water(&mut self) -> bool {
        if self.state != CropState::Planted {
            return false;
        }
        self.transition(CropState::Growing);
        self.stage = 0;
        true
    }

    /// Advance timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> CropTick {
        match self.state {
            CropState::Growing => {
                self.growth_timer += dt;
                if self.growth_timer >= self.growth_duration {
                    self.transition(CropState::ReadyToHarvest);
                    self.stage = self.last_stage();
                    return CropTick::Ripened;
                }
                let stage = stage_for(self.growth_timer, self.growth_duration, self.growth_stages);
                if stage != self.stage {
                    self.stage = stage;
                    return CropTick::Stage(stage);
                }
                CropTick::Unchanged
            }
            CropState::Withered => {
                self.wither_timer += dt;
                if self.wither_timer >= self.wither_duration {
                    self.transition(CropState::Removed);
                    return CropTick::Expired;
                }
                CropTick::Unchanged
            }
            _ => CropTick::Unchanged,
        }
    }

    /// ReadyToHarvest → Removed, yielding the harvest value.
    pub fn harvest(&mut self) -> Option<u32> {
        if self.state != CropState::ReadyToHarvest {
            return None;
        }
        self.transition(CropState::Removed);
        Some(self.harvest_value)
    }

    /// Externally triggered. Returns false if already withered or removed.
    pub fn wither(&mut self) -> bool {
        if matches!(self.state, CropState::Withered | CropState::Removed) {
            return false;
        }
        self.transition(CropState::Withered);
        true
    }

    /// The single "use" action a player has on a crop.
    pub fn interact(&mut self) -> CropAction {
        match self.state {
            CropState::Planted => {
                self.water();
                CropAction::Watered
            }
            CropState::Growing | CropState::Removed => CropAction::Nothing,
            CropState::ReadyToHarvest => match self.harvest() {
                Some(value) => CropAction::Harvested(value),
                None => CropAction::Nothing,
            },
            CropState::Withered => {
                self.transition(CropState::Removed);
                CropAction::Cleared
            }
        }
    }

    /// Prompt verb for the interact action in the current state.
    pub fn action_label(&self) -> &'static str {
        match self.state {
            CropState::Planted => "Water",
            CropState::Growing => "Wait",
            CropState::ReadyToHarvest => "Harvest",
            CropState::Withered => "Remove",
            CropState::Removed => "Interact",
        }
    }
}

/// Linear interpolation of elapsed/duration onto `0..stages`.
pub fn stage_for(elapsed: f32, duration: f32, stages: u8) -> u8 {
    if stages <= 1 || duration <= 0.0 {
        return 0;
    }
    let last = stages - 1;
    let t = (elapsed / duration).clamp(0.0, 1.0);
    ((t * last as f32).floor() as u8).min(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrot() -> Crop {
        Crop::from_def(&CropDef {
            crop_type: "Carrots".to_string(),
            growth_secs: 10.0,
            wither_secs: 30.0,
            harvest_value: 10,
            growth_stages: 3,
        })
    }

    #[test]
    fn test_planted_does_not_grow_until_watered() {
        let mut crop = carrot();
        assert_eq!(crop.tick(100.0), CropTick::Unchanged);
        assert_eq!(crop.state(), CropState::Planted);
        assert_eq!(crop.growth_timer(), 0.0);
    }

    #[test]
    fn test_water_only_from_planted() {
        let mut crop = carrot();
        assert!(crop.water());
        assert_eq!(crop.state(), CropState::Growing);
        assert!(!crop.water());
    }

    #[test]
    fn test_stages_follow_elapsed_fraction() {
        let mut crop = carrot();
        crop.water();
        assert_eq!(crop.tick(4.0), CropTick::Unchanged);
        assert_eq!(crop.stage(), 0);
        assert_eq!(crop.tick(1.0), CropTick::Stage(1));
        assert_eq!(crop.tick(4.0), CropTick::Unchanged);
        assert_eq!(crop.stage(), 1);
    }

    #[test]
    fn test_ripens_at_growth_duration_and_resets_timer() {
        let mut crop = carrot();
        crop.water();
        crop.tick(6.0);
        assert_eq!(crop.tick(4.0), CropTick::Ripened);
        assert_eq!(crop.state(), CropState::ReadyToHarvest);
        assert_eq!(crop.growth_timer(), 0.0);
        assert_eq!(crop.stage(), 2);
        assert_eq!(crop.action_label(), "Harvest");
    }

    #[test]
    fn test_ready_crop_waits_indefinitely() {
        let mut crop = carrot();
        crop.water();
        crop.tick(10.0);
        for _ in 0..100 {
            assert_eq!(crop.tick(10.0), CropTick::Unchanged);
        }
        assert_eq!(crop.state(), CropState::ReadyToHarvest);
    }

    #[test]
    fn test_harvest_awards_value_once() {
        let mut crop = carrot();
        assert_eq!(crop.harvest(), None);
        crop.water();
        crop.tick(10.0);
        assert_eq!(crop.harvest(), Some(10));
        assert_eq!(crop.state(), CropState::Removed);
        assert_eq!(crop.harvest(), None);
    }

    #[test]
    fn test_wither_timer_only_runs_while_withered() {
        let mut crop = carrot();
        crop.water();
        crop.tick(3.0);
        assert_eq!(crop.wither_timer(), 0.0);

        assert!(crop.wither());
        assert_eq!(crop.growth_timer(), 0.0);
        assert_eq!(crop.tick(12.0), CropTick::Unchanged);
        assert_eq!(crop.wither_timer(), 12.0);
        assert!(!crop.wither());
        assert_eq!(crop.wither_timer(), 12.0);
    }

    #[test]
    fn test_withered_crop_expires() {
        let mut crop = carrot();
        crop.wither();
        assert_eq!(crop.tick(29.0), CropTick::Unchanged);
        assert_eq!(crop.tick(1.0), CropTick::Expired);
        assert_eq!(crop.state(), CropState::Removed);
    }

    #[test]
    fn test_growing_never_withers_by_time() {
        let mut crop = carrot();
        crop.water();
        crop.growth_duration = 1_000.0;
        crop.tick(500.0);
        assert_eq!(crop.state(), CropState::Growing);
        assert_eq!(crop.wither_timer(), 0.0);
    }

    #[test]
    fn test_interact_dispatches_by_state() {
        let mut crop = carrot();
        assert_eq!(crop.action_label(), "Water");
        assert_eq!(crop.interact(), CropAction::Watered);
        assert_eq!(crop.action_label(), "Wait");
        assert_eq!(crop.interact(), CropAction::Nothing);
        crop.tick(10.0);
        assert_eq!(crop.interact(), CropAction::Harvested(10));

        let mut dead = carrot();
        dead.wither();
        assert_eq!(dead.action_label(), "Remove");
        assert_eq!(dead.interact(), CropAction::Cleared);
        assert_eq!(dead.state(), CropState::Removed);
    }

    #[test]
    fn test_stage_for_edges() {
        assert_eq!(stage_for(0.0, 10.0, 3), 0);
        assert_eq!(stage_for(9.99, 10.0, 3), 1);
        assert_eq!(stage_for(50.0, 10.0, 3), 2);
        assert_eq!(stage_for(5.0, 10.0, 1), 0);
        assert_eq!(stage_for(5.0, 0.0, 3), 0);
    }
}

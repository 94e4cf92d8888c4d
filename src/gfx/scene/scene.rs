use crate::{
    animation::{AnimationPlayer, AnimationSet},
    gfx::scene::{asset::Asset, lights::LightingRig},
};

/// The asset currently on stage together with its animations.
///
/// These are held in one value so they are always replaced together.
#[derive(Debug, Clone)]
pub struct ResidentAsset {
    pub asset: Asset,
    pub animations: AnimationSet,
    /// Present only when `animations` is non-empty
    pub player: Option<AnimationPlayer>,
}

impl ResidentAsset {
    /// Wraps a freshly loaded asset. A player is created when the asset has
    /// at least one clip, with every clip playing.
    pub fn new(asset: Asset, animations: AnimationSet) -> Self {
        let player = if animations.is_empty() {
            None
        } else {
            let mut player = AnimationPlayer::new(&animations, &asset);
            player.play_all();
            Some(player)
        };

        Self {
            asset,
            animations,
            player,
        }
    }

    /// Advances the player, if any, and poses the asset.
    pub fn animate(&mut self, dt: f32) {
        if let Some(player) = self.player.as_mut() {
            player.update(dt, &self.animations, &mut self.asset);
        }
    }

    pub fn stop_all(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.stop_all(&mut self.asset);
        }
    }
}

/// Lighting plus at most one resident asset
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub lights: LightingRig,
    resident: Option<ResidentAsset>,
}

impl Scene {
    pub fn new(lights: LightingRig) -> Self {
        Self {
            lights,
            resident: None,
        }
    }

    pub fn resident(&self) -> Option<&ResidentAsset> {
        self.resident.as_ref()
    }

    pub fn resident_mut(&mut self) -> Option<&mut ResidentAsset> {
        self.resident.as_mut()
    }

    pub fn asset(&self) -> Option<&Asset> {
        self.resident.as_ref().map(|r| &r.asset)
    }

    /// Puts `resident` on stage, returning whatever was there before.
    pub fn attach(&mut self, resident: ResidentAsset) -> Option<ResidentAsset> {
        self.resident.replace(resident)
    }

    /// Stops all actions of the resident asset and removes it.
    pub fn detach(&mut self) -> Option<ResidentAsset> {
        let mut resident = self.resident.take()?;
        resident.stop_all();
        Some(resident)
    }
}

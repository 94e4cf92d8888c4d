//! Playback of the clips bundled with the resident asset
//!
//! The player keeps one action per clip. Any number of actions can play at
//! once; channels of different actions that target the same node property
//! are blended with equal weights.

use std::collections::HashMap;

use cgmath::{InnerSpace, Quaternion, Vector3};

use super::clip::{normalize_or_identity, AnimationSet, ChannelProperty, Sample};
use crate::gfx::scene::asset::{Asset, NodeId, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Action {
    time: f32,
    playing: bool,
}

/// Running blend of every sample that targets one node property
enum Blend {
    Vector { sum: Vector3<f32>, count: u32 },
    Rotation { sum: Quaternion<f32> },
}

impl Blend {
    fn new(sample: Sample) -> Self {
        match sample {
            Sample::Vector(v) => Blend::Vector { sum: v, count: 1 },
            Sample::Rotation(q) => Blend::Rotation { sum: q },
        }
    }

    fn add(&mut self, sample: Sample) {
        match (self, sample) {
            (Blend::Vector { sum, count }, Sample::Vector(v)) => {
                *sum += v;
                *count += 1;
            }
            (Blend::Rotation { sum }, Sample::Rotation(q)) => {
                // Keep every contribution in the same hemisphere
                let q = if sum.dot(q) < 0.0 { -q } else { q };
                *sum = *sum + q;
            }
            _ => log::warn!("Mismatched animation sample types on one channel target"),
        }
    }
}

/// Mixer over an [`AnimationSet`]
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    actions: Vec<Action>,
    rest_pose: HashMap<NodeId, Transform>,
}

impl AnimationPlayer {
    /// Creates a player with every action stopped and records the rest pose
    /// of every node the set animates.
    pub fn new(set: &AnimationSet, asset: &Asset) -> Self {
        let mut rest_pose = HashMap::new();
        for clip in set.clips() {
            for channel in &clip.channels {
                if let Some(node) = asset.node(channel.target) {
                    rest_pose.entry(channel.target).or_insert(node.transform);
                }
            }
        }

        Self {
            actions: vec![
                Action {
                    time: 0.0,
                    playing: false,
                };
                set.len()
            ],
            rest_pose,
        }
    }

    /// Starts the clip at `index` from time 0. Other actions are untouched.
    pub fn play(&mut self, index: usize) {
        if let Some(action) = self.actions.get_mut(index) {
            action.time = 0.0;
            action.playing = true;
        }
    }

    pub fn play_all(&mut self) {
        for index in 0..self.actions.len() {
            self.play(index);
        }
    }

    /// Stops every action and puts animated nodes back in their rest pose.
    pub fn stop_all(&mut self, asset: &mut Asset) {
        for action in &mut self.actions {
            action.playing = false;
            action.time = 0.0;
        }
        for (&id, rest) in &self.rest_pose {
            if let Some(node) = asset.node_mut(id) {
                node.transform = *rest;
            }
        }
    }

    /// Indices of the clips currently playing
    pub fn active_clips(&self) -> Vec<usize> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, action)| action.playing)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_playing(&self) -> bool {
        self.actions.iter().any(|action| action.playing)
    }

    /// Advances playing actions by `dt` seconds and writes the blended pose
    /// into the asset's node transforms.
    pub fn update(&mut self, dt: f32, set: &AnimationSet, asset: &mut Asset) {
        let mut blends: HashMap<(NodeId, ChannelProperty), Blend> = HashMap::new();

        for (index, action) in self.actions.iter_mut().enumerate() {
            if !action.playing {
                continue;
            }
            let Some(clip) = set.get(index) else {
                continue;
            };

            action.time += dt;
            let duration = clip.duration();
            if duration > 0.0 {
                action.time = action.time.rem_euclid(duration);
            }

            for (channel, sample) in clip.sample(action.time) {
                blends
                    .entry((channel.target, channel.property))
                    .and_modify(|blend| blend.add(sample))
                    .or_insert_with(|| Blend::new(sample));
            }
        }

        for ((id, property), blend) in blends {
            let Some(node) = asset.node_mut(id) else {
                continue;
            };
            let transform = &mut node.transform;
            match (property, blend) {
                (ChannelProperty::Translation, Blend::Vector { sum, count }) => {
                    transform.translation = sum / count as f32;
                }
                (ChannelProperty::Scale, Blend::Vector { sum, count }) => {
                    transform.scale = sum / count as f32;
                }
                (ChannelProperty::Rotation, Blend::Rotation { sum }) => {
                    transform.rotation = normalize_or_identity(sum);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{tests::translation_channel, AnimationClip};
    use crate::gfx::scene::asset::tests::cube_asset;

    fn two_clip_set() -> AnimationSet {
        AnimationSet::new(vec![
            AnimationClip::new("rise", vec![translation_channel(1, vec![0.0, 2.0], vec![0.0, 2.0])]),
            AnimationClip::new("leap", vec![translation_channel(1, vec![0.0, 2.0], vec![0.0, 4.0])]),
        ])
    }

    #[test]
    fn test_simultaneous_clips_blend_equally() {
        let set = two_clip_set();
        let mut asset = cube_asset("a.glb", Vector3::new(0.0, 0.0, 0.0));
        let mut player = AnimationPlayer::new(&set, &asset);

        player.play_all();
        player.update(1.0, &set, &mut asset);

        assert_eq!(player.active_clips(), vec![0, 1]);
        assert_eq!(asset.nodes[1].transform.translation, Vector3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_stop_all_restores_rest_pose() {
        let set = two_clip_set();
        let mut asset = cube_asset("a.glb", Vector3::new(0.0, 0.0, 0.0));
        asset.nodes[1].transform.translation = Vector3::new(0.0, -1.0, 0.0);
        let mut player = AnimationPlayer::new(&set, &asset);

        player.play(1);
        player.update(1.0, &set, &mut asset);
        assert_eq!(asset.nodes[1].transform.translation, Vector3::new(0.0, 2.0, 0.0));

        player.stop_all(&mut asset);
        assert!(!player.is_playing());
        assert_eq!(asset.nodes[1].transform.translation, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_actions_loop_over_clip_duration() {
        let set = two_clip_set();
        let mut asset = cube_asset("a.glb", Vector3::new(0.0, 0.0, 0.0));
        let mut player = AnimationPlayer::new(&set, &asset);

        player.play(0);
        player.update(1.5, &set, &mut asset);
        player.update(1.0, &set, &mut asset);

        // 2.5s into a 2s clip wraps to 0.5s
        assert_eq!(asset.nodes[1].transform.translation, Vector3::new(0.0, 0.5, 0.0));
    }
}

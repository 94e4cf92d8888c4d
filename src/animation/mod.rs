//! Node-transform animation: clips decoded from the asset and the player
//! that mixes them.

pub mod clip;
pub mod player;

pub use clip::{AnimationClip, AnimationSet, Channel, ChannelProperty, Interpolation, Keyframes, Sample};
pub use player::AnimationPlayer;

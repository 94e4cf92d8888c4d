//! Keyframed animation clips
//!
//! A clip is a set of channels, each driving one property (translation,
//! rotation or scale) of one node. Sampling follows glTF semantics: times
//! before the first key clamp to the first value, times after the last key
//! clamp to the last one.

use cgmath::{InnerSpace, Quaternion, Vector3};

use crate::gfx::scene::asset::NodeId;

/// Node property a channel animates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelProperty {
    Translation,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Outputs hold `[in_tangent, value, out_tangent]` per keyframe
    CubicSpline,
}

/// Keyframe outputs of a channel
#[derive(Debug, Clone, PartialEq)]
pub enum Keyframes {
    Vectors(Vec<Vector3<f32>>),
    Rotations(Vec<Quaternion<f32>>),
}

/// One sampled channel value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Vector(Vector3<f32>),
    Rotation(Quaternion<f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub target: NodeId,
    pub property: ChannelProperty,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub keyframes: Keyframes,
}

impl Channel {
    fn key_count(&self) -> usize {
        let outputs = match &self.keyframes {
            Keyframes::Vectors(v) => v.len(),
            Keyframes::Rotations(r) => r.len(),
        };
        let per_key = match self.interpolation {
            Interpolation::CubicSpline => 3,
            _ => 1,
        };
        (outputs / per_key).min(self.times.len())
    }

    /// Samples the channel at `time` seconds. `None` for channels without keys.
    pub fn sample(&self, time: f32) -> Option<Sample> {
        let count = self.key_count();
        if count == 0 {
            return None;
        }

        let times = &self.times[..count];
        // Index of the first key strictly after `time`
        let next = times.partition_point(|&t| t <= time);
        if next == 0 {
            return Some(self.value_at(0));
        }
        if next >= count {
            return Some(self.value_at(count - 1));
        }

        let prev = next - 1;
        let span = times[next] - times[prev];
        let factor = if span > 0.0 {
            ((time - times[prev]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(match self.interpolation {
            Interpolation::Step => self.value_at(prev),
            Interpolation::Linear => match (self.value_at(prev), self.value_at(next)) {
                (Sample::Vector(a), Sample::Vector(b)) => Sample::Vector(a + (b - a) * factor),
                (Sample::Rotation(a), Sample::Rotation(b)) => Sample::Rotation(slerp(a, b, factor)),
                _ => unreachable!("channel keyframes share one type"),
            },
            Interpolation::CubicSpline => self.cubic(prev, next, factor, span),
        })
    }

    fn value_at(&self, key: usize) -> Sample {
        let index = match self.interpolation {
            Interpolation::CubicSpline => key * 3 + 1,
            _ => key,
        };
        match &self.keyframes {
            Keyframes::Vectors(v) => Sample::Vector(v[index]),
            Keyframes::Rotations(r) => Sample::Rotation(r[index]),
        }
    }

    fn cubic(&self, prev: usize, next: usize, t: f32, span: f32) -> Sample {
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        let (p0, m0, p1, m1) = (prev * 3 + 1, prev * 3 + 2, next * 3 + 1, next * 3);
        match &self.keyframes {
            Keyframes::Vectors(v) => Sample::Vector(
                v[p0] * h00 + v[m0] * (h10 * span) + v[p1] * h01 + v[m1] * (h11 * span),
            ),
            Keyframes::Rotations(r) => {
                let q = r[p0] * h00 + r[m0] * (h10 * span) + r[p1] * h01 + r[m1] * (h11 * span);
                Sample::Rotation(normalize_or_identity(q))
            }
        }
    }
}

/// A named animation clip
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<Channel>,
    duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            channels,
            duration,
        }
    }

    /// Time of the last keyframe across all channels
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Samples every channel at `time`.
    pub fn sample(&self, time: f32) -> impl Iterator<Item = (&Channel, Sample)> + '_ {
        self.channels
            .iter()
            .filter_map(move |channel| channel.sample(time).map(|s| (channel, s)))
    }
}

/// Shortest-path spherical interpolation
pub(crate) fn slerp(a: Quaternion<f32>, b: Quaternion<f32>, t: f32) -> Quaternion<f32> {
    let b = if a.dot(b) < 0.0 { -b } else { b };
    let dot = a.dot(b).clamp(-1.0, 1.0);
    if dot > 0.9995 {
        return normalize_or_identity(a + (b - a) * t);
    }
    let theta = dot.acos();
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;
    normalize_or_identity(a * wa + b * wb)
}

pub(crate) fn normalize_or_identity(q: Quaternion<f32>) -> Quaternion<f32> {
    let magnitude = q.magnitude();
    if magnitude > f32::EPSILON {
        q / magnitude
    } else {
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }
}

/// The clips bundled with the resident asset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSet {
    clips: Vec<AnimationClip>,
}

impl AnimationSet {
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        Self { clips }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn get(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Index of the first clip whose name matches exactly
    pub fn find(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|clip| clip.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.clips.iter().map(|clip| clip.name.clone()).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    pub(crate) fn translation_channel(target: NodeId, times: Vec<f32>, ys: Vec<f32>) -> Channel {
        Channel {
            target,
            property: ChannelProperty::Translation,
            interpolation: Interpolation::Linear,
            times,
            keyframes: Keyframes::Vectors(ys.into_iter().map(|y| Vector3::new(0.0, y, 0.0)).collect()),
        }
    }

    #[test]
    fn test_linear_sampling_interpolates_and_clamps() {
        let channel = translation_channel(0, vec![0.0, 2.0], vec![0.0, 4.0]);

        assert_eq!(channel.sample(1.0), Some(Sample::Vector(Vector3::new(0.0, 2.0, 0.0))));
        assert_eq!(channel.sample(-1.0), Some(Sample::Vector(Vector3::new(0.0, 0.0, 0.0))));
        assert_eq!(channel.sample(5.0), Some(Sample::Vector(Vector3::new(0.0, 4.0, 0.0))));
    }

    #[test]
    fn test_step_sampling_holds_previous_key() {
        let mut channel = translation_channel(0, vec![0.0, 1.0], vec![1.0, 3.0]);
        channel.interpolation = Interpolation::Step;
        assert_eq!(channel.sample(0.99), Some(Sample::Vector(Vector3::new(0.0, 1.0, 0.0))));
    }

    #[test]
    fn test_cubic_spline_hits_keyframe_values() {
        let zero = Vector3::new(0.0, 0.0, 0.0);
        let channel = Channel {
            target: 0,
            property: ChannelProperty::Scale,
            interpolation: Interpolation::CubicSpline,
            times: vec![0.0, 1.0],
            keyframes: Keyframes::Vectors(vec![
                zero,
                Vector3::new(1.0, 1.0, 1.0),
                zero,
                zero,
                Vector3::new(3.0, 3.0, 3.0),
                zero,
            ]),
        };

        assert_eq!(channel.sample(0.0), Some(Sample::Vector(Vector3::new(1.0, 1.0, 1.0))));
        // Zero tangents: midpoint is the average of the two values
        assert_eq!(channel.sample(0.5), Some(Sample::Vector(Vector3::new(2.0, 2.0, 2.0))));
    }

    #[test]
    fn test_rotation_slerp_halfway() {
        let a = Quaternion::from_angle_y(Deg(0.0));
        let b = Quaternion::from_angle_y(Deg(90.0));
        let mid = slerp(a, b, 0.5);
        let expected = Quaternion::from_angle_y(Deg(45.0));
        assert!((mid.dot(expected) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_duration_and_set_lookup() {
        let clip = AnimationClip::new("walk", vec![translation_channel(0, vec![0.0, 1.5], vec![0.0, 1.0])]);
        assert_eq!(clip.duration(), 1.5);

        let set = AnimationSet::new(vec![AnimationClip::new("idle", vec![]), clip]);
        assert_eq!(set.find("walk"), Some(1));
        assert_eq!(set.find("Walk"), None);
        assert_eq!(set.names(), vec!["idle".to_string(), "walk".to_string()]);
    }
}

//! Keyframe animation groups.
//!
//! A group bundles the channels of one named glTF animation. Each channel
//! drives one component (translation, rotation or scale) of one node. Groups
//! are advanced by wall-clock time and report their end exactly once per
//! playback.

pub mod sequencer;

use cgmath::VectorSpace;

use crate::data_structures::{instance::Instance, scene::NodeId};

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
}

impl Keyframes {
    pub fn len(&self) -> usize {
        match self {
            Keyframes::Translation(v) => v.len(),
            Keyframes::Rotation(v) => v.len(),
            Keyframes::Scale(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    /// Only the spline vertices are kept, so this samples like [`Interpolation::Linear`].
    CubicSpline,
}

#[derive(Clone, Debug)]
pub struct AnimationChannel {
    pub target: NodeId,
    pub keyframes: Keyframes,
    pub timestamps: Vec<f32>,
    pub interpolation: Interpolation,
}

impl AnimationChannel {
    pub fn duration(&self) -> f32 {
        self.timestamps.last().copied().unwrap_or(0.0)
    }

    /// Keyframe pair and blend factor for `time`.
    fn locate(&self, time: f32) -> Option<(usize, usize, f32)> {
        let last = self.timestamps.len().min(self.keyframes.len()).checked_sub(1)?;
        if time <= self.timestamps[0] {
            return Some((0, 0, 0.0));
        }
        if time >= self.timestamps[last] {
            return Some((last, last, 0.0));
        }
        let next = self.timestamps[..=last].partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.timestamps[next] - self.timestamps[prev];
        let t = match self.interpolation {
            Interpolation::Step => 0.0,
            _ if span > 0.0 => (time - self.timestamps[prev]) / span,
            _ => 0.0,
        };
        Some((prev, next, t))
    }

    /// Writes the sampled value at `time` into `local`.
    pub fn apply(&self, time: f32, local: &mut Instance) {
        let Some((a, b, t)) = self.locate(time) else {
            return;
        };
        match &self.keyframes {
            Keyframes::Translation(v) => local.position = v[a].lerp(v[b], t),
            Keyframes::Rotation(v) => local.rotation = v[a].nlerp(v[b], t),
            Keyframes::Scale(v) => local.scale = v[a].lerp(v[b], t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Playback {
    Stopped,
    Playing,
    Ended,
}

/// A named, independently playable clip.
#[derive(Clone, Debug)]
pub struct AnimationGroup {
    pub name: String,
    pub channels: Vec<AnimationChannel>,
    pub looping: bool,
    elapsed: f32,
    playback: Playback,
}

impl AnimationGroup {
    pub fn new(name: &str, channels: Vec<AnimationChannel>) -> Self {
        Self {
            name: name.to_string(),
            channels,
            looping: false,
            elapsed: 0.0,
            playback: Playback::Stopped,
        }
    }

    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .map(AnimationChannel::duration)
            .fold(0.0, f32::max)
    }

    /// Plays from the first frame.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.playback = Playback::Playing;
    }

    /// Resumes a stopped group or restarts an ended one.
    pub fn play(&mut self) {
        if self.playback == Playback::Ended {
            self.elapsed = 0.0;
        }
        self.playback = Playback::Playing;
    }

    pub fn stop(&mut self) {
        self.playback = Playback::Stopped;
    }

    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Playing
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Moves the playhead by `dt` seconds and returns `true` on the frame the
    /// group reaches its end. Looping groups wrap and never end.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.playback != Playback::Playing {
            return false;
        }
        let duration = self.duration();
        self.elapsed += dt;
        if self.elapsed < duration {
            return false;
        }
        if self.looping {
            self.elapsed = if duration > 0.0 {
                self.elapsed % duration
            } else {
                0.0
            };
            return false;
        }
        self.elapsed = duration;
        self.playback = Playback::Ended;
        true
    }

    /// Channels with the current playhead, for writing into node transforms.
    pub fn samples(&self) -> impl Iterator<Item = (&AnimationChannel, f32)> {
        self.channels.iter().map(move |c| (c, self.elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling(target: NodeId) -> AnimationGroup {
        AnimationGroup::new(
            "empty_falling",
            vec![AnimationChannel {
                target,
                keyframes: Keyframes::Translation(vec![
                    cgmath::Vector3::new(0.0, 4.0, 0.0),
                    cgmath::Vector3::new(0.0, 0.0, 0.0),
                ]),
                timestamps: vec![0.0, 2.0],
                interpolation: Interpolation::Linear,
            }],
        )
    }

    #[test]
    fn samples_between_keyframes() {
        let group = falling(0);
        let mut local = Instance::new();
        group.channels[0].apply(0.5, &mut local);
        assert_eq!(local.position, cgmath::Vector3::new(0.0, 3.0, 0.0));
        group.channels[0].apply(5.0, &mut local);
        assert_eq!(local.position, cgmath::Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn step_interpolation_holds_previous_value() {
        let mut group = falling(0);
        group.channels[0].interpolation = Interpolation::Step;
        let mut local = Instance::new();
        group.channels[0].apply(1.9, &mut local);
        assert_eq!(local.position, cgmath::Vector3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn end_fires_once() {
        let mut group = falling(0);
        group.start();
        assert!(!group.advance(1.0));
        assert!(group.advance(1.5));
        assert!(!group.advance(1.0));
        assert!(!group.is_playing());
    }

    #[test]
    fn looping_group_never_ends() {
        let mut group = falling(0);
        group.looping = true;
        group.start();
        for _ in 0..10 {
            assert!(!group.advance(0.7));
        }
        assert!(group.elapsed() < group.duration());
    }

    #[test]
    fn empty_looping_group_never_ends() {
        let mut group = AnimationGroup::new("idle", Vec::new());
        group.looping = true;
        group.start();
        assert!(!group.advance(0.5));
        assert!(group.is_playing());
        assert_eq!(group.elapsed(), 0.0);
    }

    #[test]
    fn play_resumes_a_stopped_group_and_restarts_an_ended_one() {
        let mut group = falling(0);
        group.play();
        group.advance(0.5);
        group.stop();
        group.play();
        assert_eq!(group.elapsed(), 0.5);

        assert!(group.advance(2.0));
        group.play();
        assert_eq!(group.elapsed(), 0.0);
        assert!(group.is_playing());
    }

    #[test]
    fn stopped_group_does_not_advance() {
        let mut group = falling(0);
        assert!(!group.advance(10.0));
        assert_eq!(group.elapsed(), 0.0);
    }
}

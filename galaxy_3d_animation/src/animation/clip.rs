/// Animation clips: per-bone keyframe tracks over a looping time range.

use rustc_hash::FxHashMap;
use glam::{Mat4, Quat, Vec3};
use crate::error::{Error, Result};
use super::keyframe::{interpolate, Keyframe};

/// Keyframes of one bone.
///
/// Every channel holds at least one key, in strictly increasing time.
/// Rotation keys are stored normalized.
#[derive(Debug, Clone)]
pub struct BoneTrack {
    positions: Vec<Keyframe<Vec3>>,
    rotations: Vec<Keyframe<Quat>>,
    scales: Vec<Keyframe<Vec3>>,
}

impl BoneTrack {
    /// Create a track, validating each channel.
    pub fn new(
        positions: Vec<Keyframe<Vec3>>,
        mut rotations: Vec<Keyframe<Quat>>,
        scales: Vec<Keyframe<Vec3>>,
    ) -> Result<Self> {
        validate_keys("position", &positions)?;
        validate_keys("rotation", &rotations)?;
        validate_keys("scale", &scales)?;

        for key in &mut rotations {
            if key.value.length_squared() <= f32::EPSILON {
                return Err(Error::InvalidAnimation(format!(
                    "Degenerate rotation key at t={}",
                    key.time
                )));
            }
            key.value = key.value.normalize();
        }

        Ok(Self { positions, rotations, scales })
    }

    /// Track holding one fixed pose.
    pub fn constant(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            positions: vec![Keyframe::new(0.0, position)],
            rotations: vec![Keyframe::new(0.0, rotation.normalize())],
            scales: vec![Keyframe::new(0.0, scale)],
        }
    }

    pub fn positions(&self) -> &[Keyframe<Vec3>] {
        &self.positions
    }

    pub fn rotations(&self) -> &[Keyframe<Quat>] {
        &self.rotations
    }

    pub fn scales(&self) -> &[Keyframe<Vec3>] {
        &self.scales
    }

    /// Position, rotation and scale at `time` (ticks).
    pub fn sample(&self, time: f32) -> (Vec3, Quat, Vec3) {
        (
            interpolate(time, &self.positions).unwrap_or(Vec3::ZERO),
            interpolate(time, &self.rotations).unwrap_or(Quat::IDENTITY),
            interpolate(time, &self.scales).unwrap_or(Vec3::ONE),
        )
    }

    /// Local transform `translate * rotate * scale` at `time`.
    pub fn local_transform(&self, time: f32) -> Mat4 {
        let (position, rotation, scale) = self.sample(time);
        Mat4::from_scale_rotation_translation(scale, rotation, position)
    }
}

fn validate_keys<T>(channel: &str, keys: &[Keyframe<T>]) -> Result<()> {
    if keys.is_empty() {
        return Err(Error::InvalidAnimation(format!("Empty {} channel", channel)));
    }
    if let Some(pair) = keys.windows(2).find(|w| !(w[0].time < w[1].time)) {
        return Err(Error::InvalidAnimation(format!(
            "{} keys not strictly increasing ({} then {})",
            channel, pair[0].time, pair[1].time
        )));
    }
    if let Some(key) = keys.iter().find(|k| !k.time.is_finite()) {
        return Err(Error::InvalidAnimation(format!(
            "Non-finite {} key time {}",
            channel, key.time
        )));
    }
    Ok(())
}

/// A looping animation: tracks keyed by bone name.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    /// Length in ticks
    duration: f32,
    ticks_per_second: f32,
    tracks: FxHashMap<String, BoneTrack>,
}

impl AnimationClip {
    /// Create an empty clip. Duration and tick rate must be positive.
    pub fn new(name: impl Into<String>, duration: f32, ticks_per_second: f32) -> Result<Self> {
        let name = name.into();
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(Error::InvalidAnimation(format!(
                "Clip '{}' has invalid duration {}",
                name, duration
            )));
        }
        if !(ticks_per_second > 0.0 && ticks_per_second.is_finite()) {
            return Err(Error::InvalidAnimation(format!(
                "Clip '{}' has invalid tick rate {}",
                name, ticks_per_second
            )));
        }

        Ok(Self {
            name,
            duration,
            ticks_per_second,
            tracks: FxHashMap::default(),
        })
    }

    /// Builder form of [`add_track`](Self::add_track).
    pub fn with_track(mut self, bone: impl Into<String>, track: BoneTrack) -> Self {
        self.add_track(bone, track);
        self
    }

    /// Set the track of a bone, returning the one it replaced.
    pub fn add_track(&mut self, bone: impl Into<String>, track: BoneTrack) -> Option<BoneTrack> {
        self.tracks.insert(bone.into(), track)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Track of a bone, `None` if the clip does not animate it.
    pub fn bone_track(&self, bone: &str) -> Option<&BoneTrack> {
        self.tracks.get(bone)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

#[cfg(test)]
#[path = "clip_tests.rs"]
mod tests;

/// Components read and written by the skeletal animation update.
///
/// Plain data: playback state, the bone hierarchy, the skinning matrix
/// buffer uploaded by the renderer, and the occlusion flag set by the
/// visibility pass.

use std::sync::Arc;
use bitflags::bitflags;
use glam::Mat4;
use crate::animation::{AnimationClip, Armature};

bitflags! {
    /// Component types, used to tell the renderer which data changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u32 {
        const ANIMATION      = 1 << 0;
        const ARMATURE       = 1 << 1;
        const ARMATURE_BONES = 1 << 2;
        const OCCLUSION      = 1 << 3;
    }
}

// ===== ANIMATION =====

/// Playback state of one animated entity.
///
/// `current_time` is in ticks, always kept in `[0, duration)` of the
/// current clip while playing forward.
#[derive(Debug, Clone, Default)]
pub struct AnimationComponent {
    clip: Option<Arc<AnimationClip>>,
    current_time: f32,
    /// System clock at the last advance (None = next advance uses the frame dt)
    last_time: Option<f32>,
    playing: bool,
    step_requested: bool,
}

impl AnimationComponent {
    /// Stopped component without a clip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Component playing `clip` from tick 0.
    pub fn with_clip(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip: Some(clip),
            playing: true,
            ..Self::default()
        }
    }

    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        self.clip.as_ref()
    }

    /// Replace the current clip and rewind to tick 0.
    pub fn set_clip(&mut self, clip: Option<Arc<AnimationClip>>) {
        self.clip = clip;
        self.current_time = 0.0;
        self.last_time = None;
    }

    /// Current playback position in ticks.
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Seek to a position in ticks.
    pub fn set_current_time(&mut self, ticks: f32) {
        self.current_time = ticks;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Resume playback. Time spent paused is not played back; the next
    /// advance moves by one frame.
    pub fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.last_time = None;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Ask for exactly one advance on the next update, even when paused.
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    pub fn is_step_requested(&self) -> bool {
        self.step_requested
    }

    /// Advance playback to the system clock.
    ///
    /// While playing, the position moves by the clock time elapsed since
    /// the previous advance. The first advance after a clip change or a
    /// resume has no previous clock and moves by `frame_dt`, as does a
    /// pending step request on a paused component. The result
    /// wraps modulo the clip duration.
    ///
    /// Returns `false` (and changes nothing) when there is no clip, or
    /// when paused with no step pending.
    pub fn advance(&mut self, clock: f32, frame_dt: f32) -> bool {
        let Some(clip) = &self.clip else {
            return false;
        };
        if !self.playing && !self.step_requested {
            return false;
        }
        debug_assert!(self.current_time.is_finite(), "playback position must be finite");

        let delta = if self.playing {
            self.last_time.map_or(frame_dt, |last| clock - last)
        } else {
            frame_dt
        };
        self.step_requested = false;
        self.last_time = Some(clock);

        self.current_time = (self.current_time + clip.ticks_per_second() * delta) % clip.duration();
        true
    }
}

// ===== ARMATURE =====

/// Bone hierarchy of an entity. Local transforms are rewritten by each pose.
#[derive(Debug, Clone)]
pub struct ArmatureComponent {
    pub armature: Armature,
}

impl ArmatureComponent {
    pub fn new(armature: Armature) -> Self {
        Self { armature }
    }
}

// ===== SKINNING MATRICES =====

/// Final skinning matrices, one per bone, indexed by bone id.
///
/// Sized once from the armature and overwritten in place each pose.
#[derive(Debug, Clone)]
pub struct ArmatureBonesComponent {
    matrices: Vec<Mat4>,
}

impl ArmatureBonesComponent {
    /// Buffer of `bone_count` identity matrices.
    pub fn new(bone_count: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; bone_count],
        }
    }

    /// Buffer sized for every bone of `armature`.
    pub fn for_armature(armature: &Armature) -> Self {
        Self::new(armature.bone_count())
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn matrices_mut(&mut self) -> &mut [Mat4] {
        &mut self.matrices
    }

    /// Raw column-major bytes, ready for a GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }
}

// ===== OCCLUSION =====

/// Set by the occlusion pass when the entity is hidden behind geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcclusionComponent {
    pub occluded: bool,
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod tests;

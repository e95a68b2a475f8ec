//! Skeletal animation data and sampling: keyframes, clips, armatures
//! and pose propagation.

mod armature;
mod clip;
mod keyframe;
mod pose;

pub use armature::{Armature, Bone};
pub use clip::{AnimationClip, BoneTrack};
pub use keyframe::{blend_factor, find_segment, interpolate, Interpolate, Keyframe};
pub use pose::{compute_bone_transforms, update_armature_pose};

/// Pose propagation: local bone transforms → skinning matrices.
///
/// The hierarchy is walked parent before child. Each bone's world
/// transform is `parent_world * local`; the skinning matrix written for it
/// is `world * offset`.

use glam::Mat4;
use super::armature::{Armature, Bone};
use super::clip::AnimationClip;

/// Propagate transforms through the subtree rooted at `root`.
///
/// Bones animated by `clip` get their local transform recomputed at
/// `time`; the others keep their cached one. `out[id]` receives the
/// skinning matrix of bone `id`; ids past the end of `out` are skipped.
pub fn compute_bone_transforms(
    clip: &AnimationClip,
    time: f32,
    root: usize,
    parent_transform: Mat4,
    bones: &mut [Bone],
    out: &mut [Mat4],
) {
    let mut stack = vec![(root, parent_transform)];

    while let Some((id, parent)) = stack.pop() {
        let Some(bone) = bones.get_mut(id) else {
            continue;
        };

        if let Some(track) = clip.bone_track(bone.name()) {
            let (position, rotation, scale) = track.sample(time);
            bone.position = position;
            bone.rotation = rotation;
            bone.scale = scale;
            bone.local_transform = Mat4::from_scale_rotation_translation(scale, rotation, position);
        }

        let world = parent * bone.local_transform;
        if let Some(slot) = out.get_mut(id) {
            *slot = world * *bone.offset();
        }

        // Reversed so children pop in insertion order
        stack.extend(bone.children().iter().rev().map(|&child| (child, world)));
    }
}

/// Pose a whole armature at `time` into `out`.
///
/// No-op for an armature without bones.
pub fn update_armature_pose(clip: &AnimationClip, time: f32, armature: &mut Armature, out: &mut [Mat4]) {
    if armature.is_empty() {
        return;
    }
    let root_transform = *armature.transform();
    compute_bone_transforms(clip, time, 0, root_transform, armature.bones_mut(), out);
}

#[cfg(test)]
#[path = "pose_tests.rs"]
mod tests;

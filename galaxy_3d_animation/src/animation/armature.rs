/// Armature — bone hierarchy stored as a flat arena.
///
/// Bone ids are dense indices into the arena. Bones are appended parent
/// first, so the hierarchy is a single tree rooted at bone 0.

use rustc_hash::FxHashMap;
use glam::{Mat4, Quat, Vec3};
use crate::error::{Error, Result};

/// A bone of an armature.
#[derive(Debug, Clone)]
pub struct Bone {
    id: usize,
    name: String,
    /// Local translation of the last pose
    pub(crate) position: Vec3,
    /// Local rotation of the last pose
    pub(crate) rotation: Quat,
    /// Local scale of the last pose
    pub(crate) scale: Vec3,
    /// Local transform, reused for bones the clip does not animate
    pub(crate) local_transform: Mat4,
    /// Mesh space → bone space (inverse bind pose)
    offset: Mat4,
    children: Vec<usize>,
}

impl Bone {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn local_transform(&self) -> &Mat4 {
        &self.local_transform
    }

    pub fn offset(&self) -> &Mat4 {
        &self.offset
    }

    /// Ids of the direct children, in insertion order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Bone hierarchy plus the transform applied above its root.
#[derive(Debug, Clone)]
pub struct Armature {
    bones: Vec<Bone>,
    names: FxHashMap<String, usize>,
    transform: Mat4,
}

impl Armature {
    /// Empty armature placed by `transform`.
    pub fn new(transform: Mat4) -> Self {
        Self {
            bones: Vec::new(),
            names: FxHashMap::default(),
            transform,
        }
    }

    /// Append a bone and return its id.
    ///
    /// The first bone is the root and takes no parent; every later bone
    /// needs an existing parent. Names must be unique.
    ///
    /// # Arguments
    ///
    /// * `name` - Bone name, matched against clip tracks
    /// * `local_transform` - Bind-pose transform relative to the parent
    /// * `offset` - Inverse bind matrix
    /// * `parent` - Parent bone id (`None` only for the root)
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        local_transform: Mat4,
        offset: Mat4,
        parent: Option<usize>,
    ) -> Result<usize> {
        let name = name.into();
        let id = self.bones.len();

        match (parent, id) {
            (None, 0) => {}
            (None, _) => {
                return Err(Error::InvalidArmature(format!(
                    "Bone '{}' has no parent but the armature already has a root",
                    name
                )));
            }
            (Some(_), 0) => {
                return Err(Error::InvalidArmature(format!(
                    "Root bone '{}' cannot have a parent",
                    name
                )));
            }
            (Some(p), _) if p >= id => {
                return Err(Error::InvalidArmature(format!(
                    "Bone '{}' refers to unknown parent {}",
                    name, p
                )));
            }
            (Some(_), _) => {}
        }
        if self.names.contains_key(&name) {
            return Err(Error::InvalidArmature(format!("Duplicate bone name '{}'", name)));
        }

        let (scale, rotation, position) = local_transform.to_scale_rotation_translation();
        self.bones.push(Bone {
            id,
            name: name.clone(),
            position,
            rotation,
            scale,
            local_transform,
            offset,
            children: Vec::new(),
        });
        self.names.insert(name, id);
        if let Some(p) = parent {
            self.bones[p].children.push(id);
        }

        Ok(id)
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Mutable bone arena, for pose propagation.
    pub fn bones_mut(&mut self) -> &mut [Bone] {
        &mut self.bones
    }

    pub fn bone(&self, id: usize) -> Option<&Bone> {
        self.bones.get(id)
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.names.get(name).map(|&id| &self.bones[id])
    }

    /// Transform applied above the root bone.
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }
}

#[cfg(test)]
#[path = "armature_tests.rs"]
mod tests;

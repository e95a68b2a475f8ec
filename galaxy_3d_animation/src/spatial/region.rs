/// Regions — lock-guarded octrees handed out by a spatial owner.
///
/// Queries take a shared lock on one region for the duration of a single
/// traversal call. Structural mutation (insert, move, remove) needs
/// exclusive access and happens between frames.

use std::sync::{RwLock, RwLockReadGuard};
use glam::IVec3;
use crate::camera::Frustum;
use crate::error::{Error, Result};
use super::aabb::AABB;
use super::octree::{Octree, OctreeEntry};

/// Handle to one region of a spatial owner (grid cell coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl RegionKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell coordinates as a vector.
    pub fn coords(&self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for RegionKey {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// An octree behind a reader/writer lock.
pub struct Region {
    octree: RwLock<Octree>,
}

impl Region {
    pub fn new(octree: Octree) -> Self {
        Self {
            octree: RwLock::new(octree),
        }
    }

    /// Acquire the shared lock.
    ///
    /// Fails with `LockPoisoned` if a writer panicked while holding it.
    pub fn try_read(&self) -> Result<RwLockReadGuard<'_, Octree>> {
        self.octree
            .read()
            .map_err(|_| Error::LockPoisoned("region octree".to_string()))
    }

    /// Acquire the shared lock, or `None` (with a warning) if poisoned.
    pub fn read_lock(&self) -> Option<RwLockReadGuard<'_, Octree>> {
        match self.try_read() {
            Ok(guard) => Some(guard),
            Err(error) => {
                crate::anim_warn!("galaxy3d::Region", "{}, region skipped", error);
                None
            }
        }
    }

    /// Exclusive access through `&mut self` (no locking needed).
    pub fn octree_mut(&mut self) -> &mut Octree {
        match self.octree.get_mut() {
            Ok(octree) => octree,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Visit every entry intersecting the frustum under a shared lock.
    ///
    /// The lock is released when this call returns. A poisoned region
    /// yields no entries.
    pub fn for_each_object_in_frustum<F>(&self, frustum: &Frustum, visitor: F)
    where
        F: FnMut(&OctreeEntry, bool),
    {
        if let Some(octree) = self.read_lock() {
            octree.for_each_object_in_frustum(frustum, visitor);
        }
    }
}

/// Owner of the spatial index: maps volumes to regions.
///
/// Implemented by `SpatialGrid`; tests and engines may plug their own.
pub trait RegionQueryProvider: Send + Sync {
    /// Region handles whose bounds overlap `aabb`, in ascending key order.
    fn regions_for_aabb(&self, aabb: &AABB) -> Vec<RegionKey>;

    /// Region behind a handle. `None` if no index is built there.
    fn region(&self, key: RegionKey) -> Option<&Region>;

    /// Broad phase: regions overlapping the frustum's bounding box.
    fn regions_for_frustum(&self, frustum: &Frustum) -> Vec<RegionKey> {
        self.regions_for_aabb(&frustum.bounding_aabb())
    }
}

#[cfg(test)]
#[path = "region_tests.rs"]
mod tests;

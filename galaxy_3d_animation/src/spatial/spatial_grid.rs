/// SpatialGrid — uniform grid of octree regions.
///
/// The world is split into cubic cells of `cell_size`. Each occupied cell
/// owns one static octree covering exactly that cell. An entity whose
/// bounds span several cells is indexed in each of them, so the same id
/// can come back from several region queries in one frame.
///
/// Entities spanning more than `MAX_CELLS_PER_ENTITY` cells (terrain,
/// sky domes, unbounded volumes) are kept in a single overflow region
/// instead. Every query includes it while it holds entries, and its
/// entries are frustum-tested one by one.

use rustc_hash::FxHashMap;
use glam::{IVec3, Vec3};
use crate::ecs::EntityId;
use super::aabb::AABB;
use super::octree::Octree;
use super::region::{Region, RegionKey, RegionQueryProvider};

/// Largest number of cells an entity is indexed in before it overflows.
pub const MAX_CELLS_PER_ENTITY: i64 = 64;

/// Handle of the overflow region. Cell coordinates never reach it.
pub const OVERFLOW_REGION: RegionKey = RegionKey {
    x: i32::MIN,
    y: i32::MIN,
    z: i32::MIN,
};

/// Spatial grid configuration
#[derive(Debug, Clone)]
pub struct SpatialGridConfig {
    /// Edge length of one cubic cell (world units)
    pub cell_size: f32,
    /// Depth of the octree built inside each cell
    pub max_depth: u32,
}

impl Default for SpatialGridConfig {
    fn default() -> Self {
        Self {
            cell_size: 128.0,
            max_depth: 3,
        }
    }
}

/// Grid of lazily created octree regions.
pub struct SpatialGrid {
    config: SpatialGridConfig,
    regions: FxHashMap<RegionKey, Region>,
    /// Entities too large to index per cell
    overflow: Region,
    overflow_len: usize,
    /// Last inserted bounds per entity, to find its cells on removal
    bounds: FxHashMap<EntityId, AABB>,
}

impl SpatialGrid {
    pub fn new(config: SpatialGridConfig) -> Self {
        debug_assert!(config.cell_size > 0.0, "cell size must be positive");
        Self {
            config,
            regions: FxHashMap::default(),
            overflow: Self::overflow_region(),
            overflow_len: 0,
            bounds: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &SpatialGridConfig {
        &self.config
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Number of entities held by the overflow region.
    pub fn overflow_len(&self) -> usize {
        self.overflow_len
    }

    /// Number of cell regions built so far (the overflow region excluded).
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// World-space bounds of a cell.
    pub fn cell_bounds(&self, key: RegionKey) -> AABB {
        let min = key.coords().as_vec3() * self.config.cell_size;
        AABB::new(min, min + Vec3::splat(self.config.cell_size))
    }

    /// Index an entity, replacing its previous bounds if already present.
    pub fn insert(&mut self, id: EntityId, aabb: AABB) {
        self.remove(id);

        let Some((min, max)) = self.cells_for_entity(&aabb) else {
            crate::anim_debug!(
                "galaxy3d::SpatialGrid",
                "Entity {:?} spans more than {} cells, indexed in the overflow region",
                id,
                MAX_CELLS_PER_ENTITY
            );
            self.overflow.octree_mut().insert(id, aabb);
            self.overflow_len += 1;
            self.bounds.insert(id, aabb);
            return;
        };

        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    let key = RegionKey::new(x, y, z);
                    let cell = self.cell_bounds(key);
                    let max_depth = self.config.max_depth;
                    self.regions
                        .entry(key)
                        .or_insert_with(|| Region::new(Octree::new(cell, max_depth)))
                        .octree_mut()
                        .insert(id, aabb);
                }
            }
        }

        self.bounds.insert(id, aabb);
    }

    /// Move an entity to new bounds.
    pub fn update(&mut self, id: EntityId, aabb: AABB) {
        self.insert(id, aabb);
    }

    /// Remove an entity from every region it was indexed in.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(aabb) = self.bounds.remove(&id) else {
            return false;
        };

        let Some((min, max)) = self.cells_for_entity(&aabb) else {
            self.overflow.octree_mut().remove(id);
            self.overflow_len -= 1;
            return true;
        };

        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    if let Some(region) = self.regions.get_mut(&RegionKey::new(x, y, z)) {
                        region.octree_mut().remove(id);
                    }
                }
            }
        }
        true
    }

    /// Drop all regions and entries.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.overflow = Self::overflow_region();
        self.overflow_len = 0;
        self.bounds.clear();
    }

    /// Octree with degenerate root bounds: the huge entries it holds all land
    /// in its overflow list and are tested one by one.
    fn overflow_region() -> Region {
        Region::new(Octree::new(AABB::new(Vec3::ZERO, Vec3::ZERO), 0))
    }

    /// Cells an entity is indexed in, or `None` if it belongs to the overflow region.
    fn cells_for_entity(&self, aabb: &AABB) -> Option<(IVec3, IVec3)> {
        let (min, max) = self.cell_range(aabb);
        if Self::cell_count(min, max) > MAX_CELLS_PER_ENTITY {
            return None;
        }
        Some((min, max))
    }

    /// Inclusive range of cell coordinates overlapped by `aabb`.
    fn cell_range(&self, aabb: &AABB) -> (IVec3, IVec3) {
        let inv = 1.0 / self.config.cell_size;
        // Float → int casts saturate; the lowest coordinate is reserved for the overflow region
        let floor = IVec3::splat(i32::MIN + 1);
        let min = (aabb.min * inv).floor().as_ivec3().max(floor);
        let max = (aabb.max * inv).floor().as_ivec3().max(floor);
        (min, max)
    }

    /// Number of cells in an inclusive range, saturating.
    fn cell_count(min: IVec3, max: IVec3) -> i64 {
        let span = max.as_i64vec3() - min.as_i64vec3() + 1;
        span.x.max(0).saturating_mul(span.y.max(0)).saturating_mul(span.z.max(0))
    }
}

impl RegionQueryProvider for SpatialGrid {
    fn regions_for_aabb(&self, aabb: &AABB) -> Vec<RegionKey> {
        let (min, max) = self.cell_range(aabb);
        let cell_count = Self::cell_count(min, max);

        let mut keys: Vec<RegionKey> = if cell_count > self.regions.len() as i64 {
            // Large query volume: filter the built regions instead of walking cells
            self.regions
                .keys()
                .filter(|k| {
                    let c = k.coords();
                    c.cmpge(min).all() && c.cmple(max).all()
                })
                .copied()
                .collect()
        } else {
            let mut keys = Vec::new();
            for x in min.x..=max.x {
                for y in min.y..=max.y {
                    for z in min.z..=max.z {
                        let key = RegionKey::new(x, y, z);
                        if self.regions.contains_key(&key) {
                            keys.push(key);
                        }
                    }
                }
            }
            keys
        };

        if self.overflow_len > 0 {
            keys.push(OVERFLOW_REGION);
        }
        keys.sort_unstable();
        keys
    }

    fn region(&self, key: RegionKey) -> Option<&Region> {
        if key == OVERFLOW_REGION {
            return (self.overflow_len > 0).then_some(&self.overflow);
        }
        self.regions.get(&key)
    }
}

#[cfg(test)]
#[path = "spatial_grid_tests.rs"]
mod tests;

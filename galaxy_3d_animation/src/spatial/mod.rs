//! Spatial indexing: bounding boxes, static octrees and the region grid
//! that owns them.

mod aabb;
mod octree;
mod region;
mod spatial_grid;

pub use aabb::AABB;
pub use octree::{Octree, OctreeEntry};
pub use region::{Region, RegionKey, RegionQueryProvider};
pub use spatial_grid::{SpatialGrid, SpatialGridConfig, MAX_CELLS_PER_ENTITY, OVERFLOW_REGION};

/// Octree — static octree spatial index for frustum queries.
///
/// Single-node placement: each entry is stored in exactly one node, the
/// deepest node whose AABB fully contains the entry. If the entry straddles
/// a child boundary, it stays in the parent. Entries are never split, so a
/// query never reports the same entry twice.
///
/// The tree structure is pre-allocated at construction time with a fixed
/// `max_depth`. All 8^d nodes exist regardless of occupancy.

use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::camera::{Frustum, FrustumTest};
use crate::ecs::EntityId;
use super::aabb::AABB;

/// Index of the root node in the flat node array.
const ROOT: usize = 0;

/// Location of entries that do not fit inside the root bounds.
const OVERFLOW: usize = usize::MAX;

/// An indexed object: world-space bounds and the entity it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeEntry {
    /// Entity owning the bounds
    pub id: EntityId,
    /// World-space bounds
    pub aabb: AABB,
}

/// A single node in the octree.
struct OctreeNode {
    /// World-space AABB of this node
    aabb: AABB,
    /// Index of the first child in the flat array (0 = no children / leaf)
    first_child: usize,
    /// Entries that fit in this node but in none of its children
    entries: Vec<OctreeEntry>,
}

/// Static octree over one world region.
pub struct Octree {
    /// Flat array of all octree nodes (pre-allocated, depth-first)
    nodes: Vec<OctreeNode>,
    /// Maximum depth of the tree (root = depth 0)
    max_depth: u32,
    /// Entries not contained by the root bounds; always tested individually
    overflow: Vec<OctreeEntry>,
    /// Reverse lookup: entity → node index (or OVERFLOW)
    locations: FxHashMap<EntityId, usize>,
    /// subtree_sizes[d] = total node count for a subtree of depth d
    subtree_sizes: Vec<usize>,
}

impl Octree {
    /// Create a new static octree with the given bounds and depth.
    ///
    /// # Arguments
    ///
    /// * `bounds` - World-space AABB covered by this tree
    /// * `max_depth` - Maximum tree depth (root = 0). Total nodes = (8^(d+1) - 1) / 7.
    ///   Typical values: 3–5 per region.
    pub fn new(bounds: AABB, max_depth: u32) -> Self {
        let total_nodes = Self::total_node_count(max_depth);
        let mut nodes = Vec::with_capacity(total_nodes);

        Self::build_recursive(&mut nodes, &bounds, 0, max_depth);

        debug_assert_eq!(nodes.len(), total_nodes);

        let subtree_sizes: Vec<usize> = (0..=max_depth).map(Self::total_node_count).collect();

        Self {
            nodes,
            max_depth,
            overflow: Vec::new(),
            locations: FxHashMap::default(),
            subtree_sizes,
        }
    }

    /// World-space bounds of the root node.
    pub fn bounds(&self) -> &AABB {
        &self.nodes[ROOT].aabb
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether `id` is indexed in this tree.
    pub fn contains(&self, id: EntityId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Insert an entry, or move it if `id` is already indexed.
    ///
    /// Entries not fully inside the root bounds go to an overflow list
    /// that queries test entry by entry.
    pub fn insert(&mut self, id: EntityId, aabb: AABB) {
        if self.locations.contains_key(&id) {
            self.update(id, aabb);
            return;
        }

        let node_idx = self.find_target_node(&aabb);
        self.entries_mut(node_idx).push(OctreeEntry { id, aabb });
        self.locations.insert(id, node_idx);
    }

    /// Remove an entry. Returns its last bounds if it was indexed.
    pub fn remove(&mut self, id: EntityId) -> Option<AABB> {
        let node_idx = self.locations.remove(&id)?;
        let entries = self.entries_mut(node_idx);
        let pos = entries.iter().position(|e| e.id == id)?;
        Some(entries.swap_remove(pos).aabb)
    }

    /// Update an entry's bounds (e.g. after the entity moved).
    pub fn update(&mut self, id: EntityId, aabb: AABB) {
        let target = self.find_target_node(&aabb);

        if let Some(&current) = self.locations.get(&id) {
            if current == target {
                // Same node, just update the stored AABB in place
                if let Some(entry) = self.entries_mut(current).iter_mut().find(|e| e.id == id) {
                    entry.aabb = aabb;
                    return;
                }
            }
            self.remove(id);
        }

        self.entries_mut(target).push(OctreeEntry { id, aabb });
        self.locations.insert(id, target);
    }

    /// Remove all entries (the node structure is kept).
    pub fn clear(&mut self) {
        for node in &mut self.nodes {
            node.entries.clear();
        }
        self.overflow.clear();
        self.locations.clear();
    }

    /// Visit every entry whose bounds intersect the frustum.
    ///
    /// The visitor receives the entry and `entirely_inside`:
    /// - `true` when containment was proven, either for a whole node (all
    ///   descendants reported without per-entry testing) or for the entry
    /// - `false` when the entry only intersects (or may intersect) the volume
    pub fn for_each_object_in_frustum<F>(&self, frustum: &Frustum, mut visitor: F)
    where
        F: FnMut(&OctreeEntry, bool),
    {
        for entry in &self.overflow {
            match frustum.classify_aabb(&entry.aabb) {
                FrustumTest::Outside => {}
                FrustumTest::Intersects => visitor(entry, false),
                FrustumTest::Inside => visitor(entry, true),
            }
        }

        let root_class = frustum.classify_aabb(&self.nodes[ROOT].aabb);
        self.query_recursive(ROOT, frustum, root_class, &mut visitor, 0);
    }

    /// Collect the ids of all entries intersecting the frustum.
    /// Results are appended to `results`.
    pub fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<EntityId>) {
        self.for_each_object_in_frustum(frustum, |entry, _| results.push(entry.id));
    }

    /// Entry list of a node, or the overflow list.
    fn entries_mut(&mut self, node_idx: usize) -> &mut Vec<OctreeEntry> {
        if node_idx == OVERFLOW {
            &mut self.overflow
        } else {
            &mut self.nodes[node_idx].entries
        }
    }

    /// Total number of nodes for a given depth: (8^(d+1) - 1) / 7
    fn total_node_count(max_depth: u32) -> usize {
        let mut count = 0usize;
        let mut level_count = 1usize;
        for _ in 0..=max_depth {
            count += level_count;
            level_count *= 8;
        }
        count
    }

    /// Recursively build the static node array (depth-first).
    fn build_recursive(
        nodes: &mut Vec<OctreeNode>,
        aabb: &AABB,
        depth: u32,
        max_depth: u32,
    ) {
        let node_index = nodes.len();
        nodes.push(OctreeNode {
            aabb: *aabb,
            first_child: 0,
            entries: Vec::new(),
        });

        if depth >= max_depth {
            return;
        }

        let center = aabb.center();
        nodes[node_index].first_child = nodes.len();

        for octant in 0..8u8 {
            let child_aabb = Self::octant_aabb(aabb, &center, octant);
            Self::build_recursive(nodes, &child_aabb, depth + 1, max_depth);
        }
    }

    /// Compute the AABB of a specific octant (0–7).
    ///
    /// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low, 1 = high).
    fn octant_aabb(parent: &AABB, center: &Vec3, octant: u8) -> AABB {
        AABB {
            min: Vec3::new(
                if octant & 1 == 0 { parent.min.x } else { center.x },
                if octant & 2 == 0 { parent.min.y } else { center.y },
                if octant & 4 == 0 { parent.min.z } else { center.z },
            ),
            max: Vec3::new(
                if octant & 1 == 0 { center.x } else { parent.max.x },
                if octant & 2 == 0 { center.y } else { parent.max.y },
                if octant & 4 == 0 { center.z } else { parent.max.z },
            ),
        }
    }

    /// Octant a point falls into relative to a center.
    fn point_octant(center: &Vec3, point: &Vec3) -> u8 {
        ((point.x >= center.x) as u8)
            | (((point.y >= center.y) as u8) << 1)
            | (((point.z >= center.z) as u8) << 2)
    }

    /// Find the deepest node that fully contains an AABB (OVERFLOW if the
    /// root does not).
    ///
    /// If both AABB corners fall into the same octant the entry fits
    /// entirely in that child; otherwise it straddles a boundary and
    /// stays in the current node.
    fn find_target_node(&self, aabb: &AABB) -> usize {
        if !self.nodes[ROOT].aabb.contains(aabb) {
            return OVERFLOW;
        }

        let mut node_idx = ROOT;
        let mut depth = 0;

        loop {
            let first_child = self.nodes[node_idx].first_child;
            if depth >= self.max_depth || first_child == 0 {
                return node_idx;
            }

            let center = self.nodes[node_idx].aabb.center();
            let min_oct = Self::point_octant(&center, &aabb.min);
            let max_oct = Self::point_octant(&center, &aabb.max);

            if min_oct != max_oct {
                return node_idx;
            }

            node_idx = first_child + self.subtree_offset(min_oct, self.max_depth - depth - 1);
            depth += 1;
        }
    }

    /// Offset of octant `i` in the depth-first node layout.
    fn subtree_offset(&self, octant: u8, remaining_depth: u32) -> usize {
        octant as usize * self.subtree_sizes[remaining_depth as usize]
    }

    /// Recursive 3-way traversal.
    fn query_recursive<F>(
        &self,
        node_idx: usize,
        frustum: &Frustum,
        classification: FrustumTest,
        visitor: &mut F,
        depth: u32,
    )
    where
        F: FnMut(&OctreeEntry, bool),
    {
        let node = &self.nodes[node_idx];

        match classification {
            FrustumTest::Outside => {}

            FrustumTest::Inside => self.visit_all(node_idx, visitor, depth),

            FrustumTest::Intersects => {
                for entry in &node.entries {
                    match frustum.classify_aabb(&entry.aabb) {
                        FrustumTest::Outside => {}
                        FrustumTest::Intersects => visitor(entry, false),
                        FrustumTest::Inside => visitor(entry, true),
                    }
                }

                if depth < self.max_depth && node.first_child != 0 {
                    for octant in 0..8u8 {
                        let child_idx = node.first_child
                            + self.subtree_offset(octant, self.max_depth - depth - 1);
                        let child_class = frustum.classify_aabb(&self.nodes[child_idx].aabb);
                        self.query_recursive(child_idx, frustum, child_class, visitor, depth + 1);
                    }
                }
            }
        }
    }

    /// Report a node and its entire subtree as entirely inside.
    fn visit_all<F>(&self, node_idx: usize, visitor: &mut F, depth: u32)
    where
        F: FnMut(&OctreeEntry, bool),
    {
        let node = &self.nodes[node_idx];
        for entry in &node.entries {
            visitor(entry, true);
        }

        if depth < self.max_depth && node.first_child != 0 {
            for octant in 0..8u8 {
                let child_idx = node.first_child
                    + self.subtree_offset(octant, self.max_depth - depth - 1);
                self.visit_all(child_idx, visitor, depth + 1);
            }
        }
    }
}

#[cfg(test)]
#[path = "octree_tests.rs"]
mod tests;

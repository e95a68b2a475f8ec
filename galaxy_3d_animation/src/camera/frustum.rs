/// Frustum — six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// The render system computes the frustum once per frame, usually with
/// `from_view_projection()`.

use glam::{Mat4, Vec3, Vec4};
use crate::spatial::AABB;

/// Result of a 3-way frustum/AABB classification.
///
/// Drives the octree traversal:
/// - `Outside` → skip the entire subtree
/// - `Inside` → report all objects as entirely inside, no further testing
/// - `Intersects` → test individual objects and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB straddles at least one plane
    Intersects,
    /// AABB is entirely inside the frustum
    Inside,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes for culling.
///
/// Each plane is (A, B, C, D) where Ax + By + Cz + D = 0.
/// Normal (A, B, C) points inward (toward the visible volume).
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // Gribb & Hartmann: extract planes from rows of the VP matrix
        // Each plane is normalized so that (A, B, C) is a unit vector
        let mut planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row3 + row2
            Vec4::new(m[0][3] + m[0][2], m[1][3] + m[1][2], m[2][3] + m[2][2], m[3][3] + m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        // Normalize each plane
        for plane in &mut planes {
            let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside.
    ///
    /// Returns `true` if the AABB is (potentially) inside or intersecting.
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);

            // Find the positive vertex (corner most aligned with the normal)
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            // If the positive vertex is outside this plane, the AABB is fully outside
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// Tests both the positive vertex (p-vertex) and negative vertex (n-vertex)
    /// against each plane:
    /// - If the p-vertex is outside any plane → `Outside` (early out)
    /// - If the n-vertex is outside any plane → at least `Intersects`
    /// - If all n-vertices are inside all planes → `Inside`
    ///
    /// Never returns `Outside` for a box that touches the volume. A box near
    /// a frustum edge may be reported `Intersects` while actually outside.
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);

            // Positive vertex: corner most in the direction of the normal
            let p_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            // If the p-vertex is outside → entire AABB is outside
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }

            // Negative vertex: corner least in the direction of the normal
            let n_vertex = Vec3::new(
                if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
                if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
                if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
            );

            // If the n-vertex is outside → AABB straddles this plane
            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Intersects }
    }

    /// The eight corners of the frustum volume.
    ///
    /// Each corner is the intersection of one plane from each opposite pair
    /// (left/right, bottom/top, near/far). Index bits: bit0 = right,
    /// bit1 = top, bit2 = far. A degenerate plane triple yields a
    /// non-finite corner.
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let x = if i & 1 == 0 { PLANE_LEFT } else { PLANE_RIGHT };
            let y = if i & 2 == 0 { PLANE_BOTTOM } else { PLANE_TOP };
            let z = if i & 4 == 0 { PLANE_NEAR } else { PLANE_FAR };
            *corner = Self::intersect_planes(self.planes[x], self.planes[y], self.planes[z]);
        }
        corners
    }

    /// World-space AABB enclosing the frustum volume.
    ///
    /// Used for the broad-phase region lookup. If any corner is not finite
    /// (e.g. infinite far plane) the returned box covers all of space.
    pub fn bounding_aabb(&self) -> AABB {
        let corners = self.corners();
        if corners.iter().any(|c| !c.is_finite()) {
            return AABB {
                min: Vec3::splat(f32::MIN),
                max: Vec3::splat(f32::MAX),
            };
        }

        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min = min.min(*corner);
            max = max.max(*corner);
        }
        AABB { min, max }
    }

    /// Intersection point of three planes `n·p + d = 0`.
    fn intersect_planes(a: Vec4, b: Vec4, c: Vec4) -> Vec3 {
        let (na, nb, nc) = (a.truncate(), b.truncate(), c.truncate());
        let b_cross_c = nb.cross(nc);
        let denom = na.dot(b_cross_c);
        -(b_cross_c * a.w + nc.cross(na) * b.w + na.cross(nb) * c.w) / denom
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;

use glam::{Mat4, Vec3};
use crate::spatial::AABB;
use super::*;

// ============================================================================
// Frustum::from_view_projection
// ============================================================================

#[test]
fn test_frustum_from_identity_matrix() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);

    // Identity VP → NDC cube: x,y,z in [-1, 1]
    // All 6 planes should exist and be normalized
    for plane in &frustum.planes {
        let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
        assert!((normal_len - 1.0).abs() < 1e-5, "plane normal should be unit length");
    }
}

#[test]
fn test_frustum_from_perspective_projection() {
    let projection = Mat4::perspective_rh(
        std::f32::consts::FRAC_PI_4, // 45° FOV
        16.0 / 9.0,                  // aspect ratio
        0.1,                         // near
        100.0,                       // far
    );
    let view = Mat4::look_at_rh(
        Vec3::new(0.0, 0.0, 5.0),   // eye
        Vec3::ZERO,                  // target
        Vec3::Y,                     // up
    );
    let vp = projection * view;

    let frustum = Frustum::from_view_projection(&vp);

    // Planes should be normalized
    for plane in &frustum.planes {
        let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
        assert!((normal_len - 1.0).abs() < 1e-4, "plane normal should be unit length");
    }
}

// ============================================================================
// Frustum::intersects_aabb
// ============================================================================

#[test]
fn test_aabb_inside_frustum() {
    let projection = Mat4::perspective_rh(
        std::f32::consts::FRAC_PI_2, // 90° FOV
        1.0,
        0.1,
        100.0,
    );
    let view = Mat4::look_at_rh(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
    );
    let vp = projection * view;
    let frustum = Frustum::from_view_projection(&vp);

    // AABB at the origin, should be inside the frustum
    let aabb = AABB {
        min: Vec3::new(-1.0, -1.0, -1.0),
        max: Vec3::new(1.0, 1.0, 1.0),
    };

    assert!(frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_outside_frustum() {
    let projection = Mat4::perspective_rh(
        std::f32::consts::FRAC_PI_4, // 45° FOV
        1.0,
        0.1,
        100.0,
    );
    let view = Mat4::look_at_rh(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
    );
    let vp = projection * view;
    let frustum = Frustum::from_view_projection(&vp);

    // AABB far to the right, should be outside the frustum
    let aabb = AABB {
        min: Vec3::new(100.0, 100.0, 100.0),
        max: Vec3::new(101.0, 101.0, 101.0),
    };

    assert!(!frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_behind_camera() {
    let projection = Mat4::perspective_rh(
        std::f32::consts::FRAC_PI_2,
        1.0,
        0.1,
        100.0,
    );
    let view = Mat4::look_at_rh(
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
    );
    let vp = projection * view;
    let frustum = Frustum::from_view_projection(&vp);

    // AABB behind the camera (z > 5)
    let aabb = AABB {
        min: Vec3::new(-1.0, -1.0, 10.0),
        max: Vec3::new(1.0, 1.0, 12.0),
    };

    assert!(!frustum.intersects_aabb(&aabb));
}

#[test]
fn test_aabb_intersecting_frustum_boundary() {
    let projection = Mat4::orthographic_rh(
        -5.0, 5.0,
        -5.0, 5.0,
        0.1, 100.0,
    );
    let view = Mat4::IDENTITY;
    let vp = projection * view;
    let frustum = Frustum::from_view_projection(&vp);

    // AABB partially inside (straddles the right boundary at x=5)
    let aabb = AABB {
        min: Vec3::new(4.0, 0.0, -10.0),
        max: Vec3::new(6.0, 1.0, -5.0),
    };

    assert!(frustum.intersects_aabb(&aabb));
}

// ============================================================================
// Frustum::classify_aabb
// ============================================================================

/// Orthographic box x,y in [-5, 5], z down to -100 (camera looks down -Z).
///
/// Planes are extracted with the [-1, 1] depth convention, so against
/// glam's [0, 1] depth projection the near plane sits behind the camera.
/// Culling stays conservative.
fn ortho_frustum() -> Frustum {
    let vp = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 100.0);
    Frustum::from_view_projection(&vp)
}

fn perspective_frustum() -> Frustum {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 50.0);
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

#[test]
fn test_classify_inside() {
    let frustum = ortho_frustum();
    let aabb = AABB { min: Vec3::new(-1.0, -1.0, -20.0), max: Vec3::new(1.0, 1.0, -10.0) };
    assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Inside);
}

#[test]
fn test_classify_intersects_boundary() {
    let frustum = ortho_frustum();
    // Straddles the right plane at x = 5
    let aabb = AABB { min: Vec3::new(4.0, 0.0, -10.0), max: Vec3::new(6.0, 1.0, -5.0) };
    assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Intersects);
}

#[test]
fn test_classify_touching_face_is_not_outside() {
    let frustum = ortho_frustum();
    // Shares exactly the x = 5 face with the volume
    let aabb = AABB { min: Vec3::new(5.0, 0.0, -10.0), max: Vec3::new(7.0, 1.0, -5.0) };
    assert_ne!(frustum.classify_aabb(&aabb), FrustumTest::Outside);
}

#[test]
fn test_classify_outside() {
    let frustum = ortho_frustum();
    let beside = AABB { min: Vec3::new(10.0, 0.0, -10.0), max: Vec3::new(12.0, 1.0, -5.0) };
    let beyond_far = AABB { min: Vec3::new(-1.0, -1.0, -300.0), max: Vec3::new(1.0, 1.0, -200.0) };

    assert_eq!(frustum.classify_aabb(&beside), FrustumTest::Outside);
    assert_eq!(frustum.classify_aabb(&beyond_far), FrustumTest::Outside);

    let behind = AABB { min: Vec3::new(-1.0, -1.0, 1.0), max: Vec3::new(1.0, 1.0, 2.0) };
    assert_eq!(perspective_frustum().classify_aabb(&behind), FrustumTest::Outside);
}

#[test]
fn test_classify_box_enclosing_frustum_intersects() {
    let frustum = perspective_frustum();
    let huge = AABB { min: Vec3::splat(-1000.0), max: Vec3::splat(1000.0) };
    assert_eq!(frustum.classify_aabb(&huge), FrustumTest::Intersects);
}

#[test]
fn test_classify_never_excludes_boxes_around_inside_points() {
    let frustum = perspective_frustum();
    let corners = frustum.corners();

    // Sample points strictly inside the volume by blending the corners,
    // then grow boxes of several sizes around each one.
    let steps = [0.1f32, 0.35, 0.65, 0.9];
    for &u in &steps {
        for &v in &steps {
            for &w in &steps {
                let near = corners[0].lerp(corners[1], u).lerp(corners[2].lerp(corners[3], u), v);
                let far = corners[4].lerp(corners[5], u).lerp(corners[6].lerp(corners[7], u), v);
                let point = near.lerp(far, w);

                for half in [0.01f32, 0.5, 5.0, 40.0] {
                    let aabb = AABB { min: point - Vec3::splat(half), max: point + Vec3::splat(half) };
                    assert_ne!(
                        frustum.classify_aabb(&aabb),
                        FrustumTest::Outside,
                        "box around inside point {:?} (half extent {}) was excluded",
                        point,
                        half,
                    );
                    assert!(frustum.intersects_aabb(&aabb));
                }
            }
        }
    }
}

#[test]
fn test_classify_box_beyond_any_single_plane_is_outside() {
    for frustum in [perspective_frustum(), ortho_frustum()] {
        let corners = frustum.corners();
        let center = corners.iter().copied().sum::<Vec3>() / 8.0;

        for plane in &frustum.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);

            for start in corners.iter().copied().chain(std::iter::once(center)) {
                for half in [Vec3::splat(0.01), Vec3::new(3.0, 0.5, 8.0), Vec3::splat(25.0)] {
                    // Push the box along -normal until its nearest corner is past the plane
                    let reach = normal.abs().dot(half);
                    let depth = normal.dot(start) + plane.w + reach + 0.5;
                    let box_center = start - normal * depth;
                    let aabb = AABB { min: box_center - half, max: box_center + half };

                    assert_eq!(
                        frustum.classify_aabb(&aabb),
                        FrustumTest::Outside,
                        "box {:?} lies beyond plane {:?}",
                        aabb,
                        plane,
                    );
                    assert!(!frustum.intersects_aabb(&aabb));
                }
            }
        }
    }
}

// ============================================================================
// Frustum::corners / bounding_aabb
// ============================================================================

#[test]
fn test_corners_of_identity_frustum_are_ndc_cube() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);
    for (i, corner) in frustum.corners().iter().enumerate() {
        let expected = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { -1.0 } else { 1.0 },
        );
        assert!((*corner - expected).length() < 1e-5, "corner {} = {:?}", i, corner);
    }
}

#[test]
fn test_bounding_aabb_of_orthographic_frustum() {
    let aabb = ortho_frustum().bounding_aabb();
    assert!((aabb.min - Vec3::new(-5.0, -5.0, -100.0)).length() < 1e-2);
    assert!((aabb.max.x - 5.0).abs() < 1e-3);
    assert!((aabb.max.y - 5.0).abs() < 1e-3);
    assert!(aabb.max.z >= -0.1);
}

#[test]
fn test_bounding_aabb_encloses_perspective_far_plane() {
    let aabb = perspective_frustum().bounding_aabb();
    // 90° FOV, far = 50 → far plane half-width 50
    assert!((aabb.min.z + 50.0).abs() < 0.1);
    assert!((aabb.max.x - 50.0).abs() < 0.1);
    assert!((aabb.min.y + 50.0).abs() < 0.1);
    assert!(aabb.max.z < 0.0);
}

// ============================================================================
// Plane constants
// ============================================================================

#[test]
fn test_plane_constants() {
    assert_eq!(PLANE_LEFT, 0);
    assert_eq!(PLANE_RIGHT, 1);
    assert_eq!(PLANE_BOTTOM, 2);
    assert_eq!(PLANE_TOP, 3);
    assert_eq!(PLANE_NEAR, 4);
    assert_eq!(PLANE_FAR, 5);
}

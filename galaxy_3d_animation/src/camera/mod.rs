//! Camera module — view frustum used for visibility culling.
//!
//! The frustum is computed by the camera owner (render system) once per
//! frame and is read-only for the animation core.

mod frustum;

pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};

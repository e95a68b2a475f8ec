/// Interface to the render side, as seen by the animation update.

use crate::camera::Frustum;
use crate::ecs::{ComponentMask, EntityId};

/// Render system: provides the active camera and consumes change marks.
///
/// `mark_dirty` is only called from the updating thread, after the
/// parallel phase has finished.
pub trait RenderSystem: Send + Sync {
    /// Frustum of the active camera, `None` if there is no camera.
    fn camera_frustum(&self) -> Option<Frustum>;

    /// Flag components of an entity for re-upload.
    fn mark_dirty(&self, id: EntityId, components: ComponentMask);
}

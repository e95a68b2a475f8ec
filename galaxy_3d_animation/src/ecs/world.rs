/// World — minimal component store for the animation update.
///
/// Entities live in a SlotMap; each component type has its own
/// SecondaryMap keyed by the entity. Only the component types the
/// skeletal update touches are stored.

use rustc_hash::FxHashMap;
use slotmap::{SecondaryMap, SlotMap};
use super::components::{
    AnimationComponent, ArmatureBonesComponent, ArmatureComponent, ComponentMask,
    OcclusionComponent,
};
use super::entity::EntityId;

/// A component type stored in the [`World`].
pub trait Component: Sized + Send + Sync + 'static {
    /// Flag identifying this component type
    const MASK: ComponentMask;

    fn storage(world: &World) -> &SecondaryMap<EntityId, Self>;
    fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self>;
}

macro_rules! impl_component {
    ($ty:ty, $field:ident, $mask:expr) => {
        impl Component for $ty {
            const MASK: ComponentMask = $mask;

            fn storage(world: &World) -> &SecondaryMap<EntityId, Self> {
                &world.$field
            }

            fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self> {
                &mut world.$field
            }
        }
    };
}

impl_component!(AnimationComponent, animations, ComponentMask::ANIMATION);
impl_component!(ArmatureComponent, armatures, ComponentMask::ARMATURE);
impl_component!(ArmatureBonesComponent, armature_bones, ComponentMask::ARMATURE_BONES);
impl_component!(OcclusionComponent, occlusions, ComponentMask::OCCLUSION);

/// Result of one pose job, filled in by the worker that ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseOutcome {
    /// Not run (its chunk faulted)
    Pending,
    /// No clip, or paused without a step request
    Idle,
    /// Time advanced, pose left untouched
    Occluded,
    /// Time advanced and skinning matrices rewritten
    Posed,
    /// Missing armature or skinning buffer
    Skipped,
}

/// Mutable view of one animated entity, handed to a single worker.
///
/// Jobs produced by one [`World::pose_jobs`] call borrow pairwise
/// disjoint components, so they can be processed in parallel.
pub struct PoseJob<'w> {
    pub id: EntityId,
    pub animation: &'w mut AnimationComponent,
    pub armature: Option<&'w mut ArmatureComponent>,
    pub bones: Option<&'w mut ArmatureBonesComponent>,
    pub occluded: bool,
    pub outcome: PoseOutcome,
}

/// Entity and component storage.
#[derive(Default)]
pub struct World {
    entities: SlotMap<EntityId, ()>,
    animations: SecondaryMap<EntityId, AnimationComponent>,
    armatures: SecondaryMap<EntityId, ArmatureComponent>,
    armature_bones: SecondaryMap<EntityId, ArmatureBonesComponent>,
    occlusions: SecondaryMap<EntityId, OcclusionComponent>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== ENTITIES =====

    /// Create an entity without components.
    pub fn spawn(&mut self) -> EntityId {
        self.entities.insert(())
    }

    /// Destroy an entity and all its components.
    ///
    /// Returns `false` if the entity was already gone.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.entities.remove(id).is_none() {
            return false;
        }
        self.animations.remove(id);
        self.armatures.remove(id);
        self.armature_bones.remove(id);
        self.occlusions.remove(id);
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ===== COMPONENTS =====

    /// Attach a component, returning the one it replaced.
    ///
    /// Components for despawned entities are dropped with a warning.
    pub fn insert<T: Component>(&mut self, id: EntityId, component: T) -> Option<T> {
        if !self.contains(id) {
            crate::anim_warn!("galaxy3d::World", "Component inserted for dead entity {:?}, ignored", id);
            return None;
        }
        T::storage_mut(self).insert(id, component)
    }

    /// Detach a component.
    pub fn remove<T: Component>(&mut self, id: EntityId) -> Option<T> {
        T::storage_mut(self).remove(id)
    }

    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        T::storage(self).contains_key(id)
    }

    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        T::storage(self).get(id)
    }

    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        T::storage_mut(self).get_mut(id)
    }

    /// Iterate over all components of one type.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        T::storage(self).iter()
    }

    /// Number of components of one type.
    pub fn count<T: Component>(&self) -> usize {
        T::storage(self).len()
    }

    // ===== POSE JOBS =====

    /// Split the storages into one job per entity with an animation.
    ///
    /// With `filter`, only entities listed in it get a job; the list must
    /// be sorted ascending (see [`sort_dedup`](super::sort_dedup)). Jobs
    /// come out in storage order.
    pub fn pose_jobs(&mut self, filter: Option<&[EntityId]>) -> Vec<PoseJob<'_>> {
        let World {
            animations,
            armatures,
            armature_bones,
            occlusions,
            ..
        } = self;

        let mut armatures: FxHashMap<EntityId, &mut ArmatureComponent> =
            armatures.iter_mut().collect();
        let mut bones: FxHashMap<EntityId, &mut ArmatureBonesComponent> =
            armature_bones.iter_mut().collect();
        let occlusions = &*occlusions;

        animations
            .iter_mut()
            .filter(|(id, _)| filter.map_or(true, |ids| ids.binary_search(id).is_ok()))
            .map(|(id, animation)| PoseJob {
                id,
                animation,
                armature: armatures.remove(&id),
                bones: bones.remove(&id),
                occluded: occlusions.get(id).is_some_and(|o| o.occluded),
                outcome: PoseOutcome::Pending,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;

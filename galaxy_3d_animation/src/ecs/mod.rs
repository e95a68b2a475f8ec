//! Entities and the components the skeletal animation update works on.

mod components;
mod entity;
mod world;

pub use components::{
    AnimationComponent, ArmatureBonesComponent, ArmatureComponent, ComponentMask,
    OcclusionComponent,
};
pub use entity::{sort_dedup, EntityId};
pub use world::{Component, PoseJob, PoseOutcome, World};

//! Systems: lifecycle, render interface and the skeletal animation update.

mod render;
mod skeletal_animation_system;
mod system;

pub use render::RenderSystem;
pub use skeletal_animation_system::{
    AnimationContext, AnimationSystemConfig, FrameStats, InvisiblePolicy, SkeletalAnimationSystem,
};
pub use system::{sort_by_priority, ScheduledSystem, System, SystemSettings};

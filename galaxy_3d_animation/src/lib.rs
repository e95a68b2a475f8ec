/*!
# Galaxy 3D Animation

Per-frame skeletal animation update for the Galaxy 3D engine.

Each frame the update finds the animated entities in view, advances their
playback clocks and recomputes their skinning matrices on a worker pool.
The engine plugs in through small traits (render system, spatial index)
and owns the worker pool and the component store.

## Architecture

- **Spatial**: static octrees per grid region, queried against the camera frustum
- **Scheduler**: chunked batches over a fixed worker pool, with fault containment
- **Animation**: keyframe sampling, clips, armatures and pose propagation
- **ECS**: entity ids, components and the world that stores them
- **System**: the skeletal animation update and its lifecycle
*/

// Internal modules
mod error;
pub mod log;
pub mod animation;
pub mod camera;
pub mod ecs;
pub mod scheduler;
pub mod spatial;
pub mod system;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Skeletal animation update
    pub use crate::system::{AnimationContext, SkeletalAnimationSystem};

    // Logging sub-module (types and global logger, NOT macros)
    pub mod log {
        pub use crate::log::{
            DefaultLogger, LogEntry, LogSeverity, Logger, log, log_detailed, reset_logger,
            set_logger,
        };
        // Note: anim_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Spatial index sub-module
    pub mod spatial {
        pub use crate::spatial::*;
    }

    // Worker pool sub-module
    pub mod scheduler {
        pub use crate::scheduler::*;
    }

    // Animation data sub-module
    pub mod animation {
        pub use crate::animation::*;
    }

    // Entities and components sub-module
    pub mod ecs {
        pub use crate::ecs::*;
    }

    // Systems sub-module
    pub mod system {
        pub use crate::system::*;
    }
}

// Re-export math library at crate root
pub use glam;

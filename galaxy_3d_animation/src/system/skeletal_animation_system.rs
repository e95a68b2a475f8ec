/// SkeletalAnimationSystem — per-frame pose update of visible skeletons.
///
/// One update:
/// 1. advance the system clock; stop if nothing is animated
/// 2. query the spatial regions overlapping the camera frustum
/// 3. sort and deduplicate the visible ids
/// 4. stop if nothing is visible
/// 5. build one pose job per animated entity
/// 6. run the jobs on the worker pool (advance time, pose)
/// 7. wait for every chunk
/// 8. mark the skinning buffers of posed entities dirty

use std::time::{Duration, Instant};
use crate::animation::update_armature_pose;
use crate::camera::Frustum;
use crate::ecs::{sort_dedup, AnimationComponent, ComponentMask, EntityId, PoseJob, PoseOutcome, World};
use crate::scheduler::BatchScheduler;
use crate::spatial::RegionQueryProvider;
use super::render::RenderSystem;
use super::system::System;

const SOURCE: &str = "galaxy3d::SkeletalAnimationSystem";

/// Which animated entities get updated once something is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvisiblePolicy {
    /// Every animated entity advances and is posed, visible or not
    #[default]
    UpdateAll,
    /// Only entities in the visible set are touched
    VisibleOnly,
}

/// Skeletal animation system configuration
#[derive(Debug, Clone)]
pub struct AnimationSystemConfig {
    /// Pose jobs per worker task
    pub chunk_size: usize,
    pub invisible_policy: InvisiblePolicy,
}

impl Default for AnimationSystemConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            invisible_policy: InvisiblePolicy::default(),
        }
    }
}

/// Counters of one update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Distinct entities found in the frustum
    pub visible: usize,
    /// Pose jobs handed to the scheduler
    pub scheduled: usize,
    /// Entities whose skinning matrices were rewritten
    pub posed: usize,
    /// Entities whose time advanced but were occluded
    pub occluded: usize,
    /// Entities without a clip, or paused
    pub idle: usize,
    /// Entities missing their armature or skinning buffer
    pub skipped: usize,
    /// Scheduler chunks that panicked
    pub faulted_chunks: usize,
    pub elapsed: Duration,
}

/// Everything one update borrows from the engine.
pub struct AnimationContext<'a> {
    pub world: &'a mut World,
    pub render: Option<&'a dyn RenderSystem>,
    pub spatial: Option<&'a dyn RegionQueryProvider>,
    pub scheduler: &'a BatchScheduler,
}

/// Skeletal animation update system.
pub struct SkeletalAnimationSystem {
    config: AnimationSystemConfig,
    /// Seconds accumulated over all updates
    clock: f32,
    last_stats: FrameStats,
}

impl SkeletalAnimationSystem {
    pub fn new(config: AnimationSystemConfig) -> Self {
        Self {
            config,
            clock: 0.0,
            last_stats: FrameStats::default(),
        }
    }

    pub fn config(&self) -> &AnimationSystemConfig {
        &self.config
    }

    /// Running clock in seconds.
    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Statistics of the most recent update.
    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Run one frame of the animation update.
    ///
    /// Never fails: missing collaborators end the frame early, and faults
    /// inside pose jobs leave the affected poses stale for this frame.
    pub fn update(&mut self, ctx: &mut AnimationContext<'_>, dt: f32) -> FrameStats {
        let start = Instant::now();
        let mut stats = FrameStats::default();

        self.run_frame(ctx, dt, &mut stats);

        stats.elapsed = start.elapsed();
        crate::anim_trace!(
            SOURCE,
            "visible={} scheduled={} posed={} occluded={} idle={} skipped={} faulted_chunks={} in {:?}",
            stats.visible,
            stats.scheduled,
            stats.posed,
            stats.occluded,
            stats.idle,
            stats.skipped,
            stats.faulted_chunks,
            stats.elapsed
        );
        self.last_stats = stats;
        stats
    }

    fn run_frame(&mut self, ctx: &mut AnimationContext<'_>, dt: f32, stats: &mut FrameStats) {
        self.clock += dt;

        if ctx.world.count::<AnimationComponent>() == 0 {
            return;
        }

        let Some(render) = ctx.render else {
            crate::anim_debug!(SOURCE, "No render system, frame skipped");
            return;
        };
        let Some(spatial) = ctx.spatial else {
            crate::anim_debug!(SOURCE, "No spatial index, frame skipped");
            return;
        };
        let Some(frustum) = render.camera_frustum() else {
            crate::anim_debug!(SOURCE, "No active camera, frame skipped");
            return;
        };

        let visible = collect_visible(spatial, &frustum);
        stats.visible = visible.len();
        if visible.is_empty() {
            return;
        }

        let filter = match self.config.invisible_policy {
            InvisiblePolicy::UpdateAll => None,
            InvisiblePolicy::VisibleOnly => Some(visible.as_slice()),
        };
        let mut jobs = ctx.world.pose_jobs(filter);
        stats.scheduled = jobs.len();

        let clock = self.clock;
        let report = ctx.scheduler.run_batch_mut(&mut jobs, self.config.chunk_size, |_, job| {
            job.outcome = run_pose_job(job, clock, dt);
        });
        stats.faulted_chunks = report.faulted_chunks;

        for job in &jobs {
            match job.outcome {
                PoseOutcome::Posed => {
                    stats.posed += 1;
                    render.mark_dirty(job.id, ComponentMask::ARMATURE_BONES);
                }
                PoseOutcome::Occluded => stats.occluded += 1,
                PoseOutcome::Idle => stats.idle += 1,
                PoseOutcome::Skipped => stats.skipped += 1,
                PoseOutcome::Pending => {}
            }
        }
    }
}

impl Default for SkeletalAnimationSystem {
    fn default() -> Self {
        Self::new(AnimationSystemConfig::default())
    }
}

impl<'a> System<AnimationContext<'a>> for SkeletalAnimationSystem {
    fn name(&self) -> &str {
        "SkeletalAnimationSystem"
    }

    fn update(&mut self, ctx: &mut AnimationContext<'a>, dt: f32) {
        SkeletalAnimationSystem::update(self, ctx, dt);
    }
}

/// Ids of every indexed entity inside the frustum, sorted and unique.
fn collect_visible(spatial: &dyn RegionQueryProvider, frustum: &Frustum) -> Vec<EntityId> {
    let mut ids = Vec::new();

    for key in spatial.regions_for_frustum(frustum) {
        let Some(region) = spatial.region(key) else {
            continue;
        };
        region.for_each_object_in_frustum(frustum, |entry, entirely_inside| {
            if entirely_inside || frustum.intersects_aabb(&entry.aabb) {
                ids.push(entry.id);
            }
        });
    }

    sort_dedup(&mut ids);
    ids
}

/// Advance one entity's playback and pose it.
fn run_pose_job(job: &mut PoseJob<'_>, clock: f32, dt: f32) -> PoseOutcome {
    let (Some(armature), Some(bones)) = (job.armature.as_deref_mut(), job.bones.as_deref_mut()) else {
        crate::anim_warn!(SOURCE, "Entity {:?} has no armature or skinning buffer", job.id);
        return PoseOutcome::Skipped;
    };
    if bones.len() < armature.armature.bone_count() {
        crate::anim_warn!(
            SOURCE,
            "Entity {:?} skinning buffer holds {} matrices for {} bones",
            job.id,
            bones.len(),
            armature.armature.bone_count()
        );
        return PoseOutcome::Skipped;
    }

    if !job.animation.advance(clock, dt) {
        return PoseOutcome::Idle;
    }
    if job.occluded {
        return PoseOutcome::Occluded;
    }

    let Some(clip) = job.animation.clip() else {
        return PoseOutcome::Idle;
    };
    update_armature_pose(clip, job.animation.current_time(), &mut armature.armature, bones.matrices_mut());
    PoseOutcome::Posed
}

#[cfg(test)]
#[path = "skeletal_animation_system_tests.rs"]
mod tests;

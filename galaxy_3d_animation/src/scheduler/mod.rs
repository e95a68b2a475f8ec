//! Parallel batch scheduling over a fixed worker pool.

mod batch_scheduler;

pub use batch_scheduler::{
    chunk_ranges, BatchHandle, BatchReport, BatchScheduler, SchedulerConfig,
};

/// BatchScheduler — fans index ranges out over a fixed worker pool.
///
/// A batch of `item_count` indices is cut into contiguous chunks of at most
/// `chunk_size` indices; each chunk runs as one pool task. Chunks run in no
/// particular order. A chunk that panics is contained: it is counted and
/// logged, its siblings still run, and waiting on the batch still returns.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use crate::error::{Error, Result};

const SOURCE: &str = "galaxy3d::BatchScheduler";

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of worker threads (0 = one per available core)
    pub worker_count: usize,
    /// Worker thread names are `<prefix>-<index>`
    pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: 0,
            thread_name_prefix: "galaxy3d-worker".to_string(),
        }
    }
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of chunks the batch was cut into
    pub chunks: usize,
    /// Chunks that panicked (their remaining indices were not run)
    pub faulted_chunks: usize,
}

impl BatchReport {
    /// Whether every chunk ran to completion.
    pub fn is_clean(&self) -> bool {
        self.faulted_chunks == 0
    }
}

/// Split `0..item_count` into contiguous ranges of at most `chunk_size`.
///
/// A chunk size of 0 is treated as 1.
pub fn chunk_ranges(item_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    let chunk_size = chunk_size.max(1);
    (0..item_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(item_count))
        .collect()
}

// ===== BATCH HANDLE =====

struct BatchState {
    chunks: usize,
    remaining: Mutex<usize>,
    all_done: Condvar,
    faulted: AtomicUsize,
}

impl BatchState {
    fn finish_chunk(&self, faulted: bool) {
        if faulted {
            self.faulted.fetch_add(1, Ordering::Relaxed);
        }
        let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        *remaining -= 1;
        if *remaining == 0 {
            self.all_done.notify_all();
        }
    }

    fn report(&self) -> BatchReport {
        BatchReport {
            chunks: self.chunks,
            faulted_chunks: self.faulted.load(Ordering::Relaxed),
        }
    }
}

/// Completion handle of a submitted batch.
///
/// Dropping the handle does not cancel the batch.
pub struct BatchHandle {
    state: Arc<BatchState>,
}

impl BatchHandle {
    /// Block until every chunk of the batch has finished.
    ///
    /// Must not be called from a worker of the pool that runs the batch.
    pub fn wait_all(&self) -> BatchReport {
        let mut remaining = self.state.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        while *remaining > 0 {
            remaining = self
                .state
                .all_done
                .wait(remaining)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(remaining);
        self.state.report()
    }

    /// Whether every chunk has finished, without blocking.
    pub fn is_complete(&self) -> bool {
        *self.state.remaining.lock().unwrap_or_else(PoisonError::into_inner) == 0
    }
}

// ===== SCHEDULER =====

/// Fixed-size worker pool running chunked batches.
pub struct BatchScheduler {
    pool: rayon::ThreadPool,
}

impl BatchScheduler {
    /// Spawn the worker threads.
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        let worker_count = if config.worker_count == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            config.worker_count
        };

        let prefix = config.thread_name_prefix;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(move |index| format!("{}-{}", prefix, index))
            .build()
            .map_err(|e| {
                log_and_return_error(Error::InitializationFailed(format!(
                    "Failed to build worker pool: {}",
                    e
                )))
            })?;

        crate::anim_debug!(SOURCE, "Worker pool started with {} threads", pool.current_num_threads());

        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `work(i)` for every `i` in `0..item_count` on the pool.
    ///
    /// Returns immediately; use [`BatchHandle::wait_all`] to block until
    /// the batch is done. `work` must be safe to call concurrently for
    /// distinct indices.
    pub fn submit_batch<F>(&self, item_count: usize, chunk_size: usize, work: F) -> BatchHandle
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let ranges = chunk_ranges(item_count, chunk_size);
        let state = Arc::new(BatchState {
            chunks: ranges.len(),
            remaining: Mutex::new(ranges.len()),
            all_done: Condvar::new(),
            faulted: AtomicUsize::new(0),
        });
        let work = Arc::new(work);

        for range in ranges {
            let state = Arc::clone(&state);
            let work = Arc::clone(&work);
            self.pool.spawn(move || {
                let faulted = !run_chunk(range.clone(), || {
                    for index in range.clone() {
                        work(index);
                    }
                });
                state.finish_chunk(faulted);
            });
        }

        BatchHandle { state }
    }

    /// Run `work(i, &mut items[i])` for every item on the pool and wait.
    ///
    /// Each chunk owns a disjoint sub-slice, so workers never alias.
    /// Returns once every chunk has finished.
    pub fn run_batch_mut<T, F>(&self, items: &mut [T], chunk_size: usize, work: F) -> BatchReport
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        let chunk_size = chunk_size.max(1);
        let chunks = items.len().div_ceil(chunk_size);
        let faulted = AtomicUsize::new(0);

        self.pool.scope(|scope| {
            for (chunk_index, slice) in items.chunks_mut(chunk_size).enumerate() {
                let work = &work;
                let faulted = &faulted;
                scope.spawn(move |_| {
                    let base = chunk_index * chunk_size;
                    let range = base..base + slice.len();
                    let ok = run_chunk(range, || {
                        for (offset, item) in slice.iter_mut().enumerate() {
                            work(base + offset, item);
                        }
                    });
                    if !ok {
                        faulted.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        BatchReport {
            chunks,
            faulted_chunks: faulted.into_inner(),
        }
    }
}

/// Log an error before handing it back to the caller.
fn log_and_return_error(error: Error) -> Error {
    crate::anim_error!(SOURCE, "{}", error);
    error
}

/// Run one chunk, containing any panic. Returns `false` if it panicked.
fn run_chunk<F: FnOnce()>(range: Range<usize>, chunk: F) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(chunk)) {
        Ok(()) => true,
        Err(payload) => {
            crate::anim_error!(
                SOURCE,
                "Chunk {}..{} panicked: {}",
                range.start,
                range.end,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
#[path = "batch_scheduler_tests.rs"]
mod tests;

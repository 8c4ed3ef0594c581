use crate::outcome::DiffOutcome;
use crate::progress::ProgressReporter;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};

const FALLBACK_WORKERS: usize = 2;

/// A unit of work the scheduler can run.
pub trait WorkItem: Send + Sync {
    /// Path reported if the item fails without producing its own outcome.
    fn source_path(&self) -> &Path;
}

/// Runs independent comparisons on a fixed-size worker pool.
pub struct ComparisonScheduler {
    workers: usize,
}

impl ComparisonScheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute every item and return all their outcomes once the whole batch
    /// has finished. Outcomes are merged on the calling side; workers share no
    /// mutable state beyond a completion counter.
    ///
    /// An empty batch yields a single "no images to compare" failure for
    /// `input_root`. A panicking item yields a failure outcome of its own and
    /// does not disturb its siblings.
    pub fn run_all<T, F>(
        &self,
        input_root: &Path,
        items: &[T],
        execute: F,
        reporter: &dyn ProgressReporter,
    ) -> Vec<DiffOutcome>
    where
        T: WorkItem,
        F: Fn(&T) -> Vec<DiffOutcome> + Sync,
    {
        if items.is_empty() {
            warn!("No images to compare under '{}'", input_root.display());
            return vec![DiffOutcome::no_images(input_root)];
        }

        let total = items.len();
        let completed = AtomicUsize::new(0);
        reporter.on_compare_start(total);

        let run_one = |item: &T| {
            let outcomes = run_guarded(item, &execute);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.on_compare_progress(done, total);
            outcomes
        };

        // The pool is dropped, and its threads released, when this scope ends.
        let per_item: Vec<Vec<DiffOutcome>> = match self.build_pool() {
            Some(pool) => {
                info!(
                    "Comparing {} pairs on {} workers",
                    total,
                    pool.current_num_threads()
                );
                pool.install(|| items.par_iter().map(run_one).collect())
            }
            None => {
                error!("No worker pool available, comparing {} pairs on the calling thread", total);
                items.iter().map(run_one).collect()
            }
        };

        per_item.into_iter().flatten().collect()
    }

    fn build_pool(&self) -> Option<ThreadPool> {
        let build = |threads: usize| {
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("disparity-worker-{}", i))
                .build()
        };

        match build(self.workers) {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(
                    "Failed to create a pool of {} workers ({}), retrying with {}",
                    self.workers, e, FALLBACK_WORKERS
                );
                build(FALLBACK_WORKERS)
                    .map_err(|e| error!("Failed to create fallback pool: {}", e))
                    .ok()
            }
        }
    }
}

fn run_guarded<T, F>(item: &T, execute: &F) -> Vec<DiffOutcome>
where
    T: WorkItem,
    F: Fn(&T) -> Vec<DiffOutcome>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| execute(item))) {
        Ok(outcomes) => outcomes,
        Err(payload) => {
            let reason = format!("comparison panicked: {}", panic_message(payload.as_ref()));
            error!("{} ({})", reason, item.source_path().display());
            vec![DiffOutcome::failure(item.source_path(), reason)]
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

use crate::config::AppConfig;
use crate::diff;
use crate::error::Error;
use crate::outcome::DiffOutcome;
use crate::pairing;
use crate::progress::ProgressReporter;
use crate::prune::{self, PruneReport};
use crate::scheduler::ComparisonScheduler;
use crate::snapshot::{self, Endpoints, SnapshotDirectory};
use crate::task::ComparisonTask;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct DisparityEngine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct RunResult {
    pub outcomes: Vec<DiffOutcome>,
    pub endpoints: Option<Endpoints>,
    pub pair_count: usize,
    pub compare_duration: Duration,
    pub prune: Option<PruneReport>,
}

impl RunResult {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
}

impl DisparityEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Snapshot directories under the input root, oldest first.
    pub fn snapshots(&self) -> Result<Vec<SnapshotDirectory>, Error> {
        let pattern = snapshot::compile_pattern(&self.config.dir_pattern)?;
        Ok(snapshot::select_snapshot_dirs(&self.config.input, &pattern))
    }

    /// Run a full comparison:
    /// 1. Select the oldest and newest snapshot directories
    /// 2. Pair identically named files between them
    /// 3. Diff every pair on the worker pool
    /// 4. Optionally prune the snapshots in between
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunResult, Error> {
        info!("Start!");
        let snapshots = self.snapshots()?;
        reporter.on_select_complete(snapshots.len());
        info!(
            "{} snapshot directories under '{}'",
            snapshots.len(),
            self.config.input.display()
        );

        let endpoints = snapshot::select_endpoints(&snapshots, self.config.single_snapshot);
        let pairs = match &endpoints {
            Some(ends) => {
                debug!("Comparing '{}' against '{}'", ends.oldest.name, ends.newest.name);
                pairing::pair_files(&ends.oldest.path, &ends.newest.path, self.config.recursive)
            }
            None => Vec::new(),
        };
        let pair_count = pairs.len();
        reporter.on_pairing_complete(pair_count);
        info!("{} matching files", pair_count);

        let diff_dir = self.config.diff_dir();
        // `shot` and `shot.png` both map to `shot.png`; every task needs its own file.
        let mut taken = HashSet::new();
        let tasks: Vec<ComparisonTask> = pairs
            .into_iter()
            .map(|pair| {
                let mut task = ComparisonTask::new(pair, &diff_dir, self.config.fuzziness);
                task.output_path = diff::unique_output_path(task.output_path, &mut taken);
                task
            })
            .collect();

        let compare_start = Instant::now();
        let scheduler = ComparisonScheduler::new(self.config.worker_count());
        let outcomes = scheduler.run_all(&self.config.input, &tasks, ComparisonTask::run, reporter);
        let compare_duration = compare_start.elapsed();
        reporter.on_compare_complete(outcomes.len(), compare_duration.as_secs_f64());
        debug!(
            "Comparison completed in {:.2}s, {} outcomes",
            compare_duration.as_secs_f64(),
            outcomes.len()
        );

        // Only after the batch is done, so no comparison reads a pruned file.
        let prune = match &endpoints {
            Some(ends) if self.config.prune && pair_count > 0 => {
                info!("Pruning intermediate snapshots...");
                let report = prune::prune_between(&snapshots, ends);
                reporter.on_prune_complete(report.removed.len(), report.failed.len());
                Some(report)
            }
            _ => None,
        };

        info!("End!");
        Ok(RunResult {
            outcomes,
            endpoints,
            pair_count,
            compare_duration,
            prune,
        })
    }
}

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif progress bars.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_select_complete(&self, _snapshots: usize) {}
    fn on_pairing_complete(&self, _pairs: usize) {}
    fn on_compare_start(&self, _total_pairs: usize) {}
    /// Called from worker threads as each comparison finishes.
    fn on_compare_progress(&self, _completed: usize, _total_pairs: usize) {}
    fn on_compare_complete(&self, _outcomes: usize, _duration_secs: f64) {}
    fn on_prune_complete(&self, _removed: usize, _failed: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

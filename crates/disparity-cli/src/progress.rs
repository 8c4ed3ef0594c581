use disparity_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "  {spinner:.cyan} Comparing [{bar:30.cyan/dim}] {pos}/{len} images ({eta} remaining)";

/// CLI progress reporter.
///
/// Only the comparison batch gets a bar; selection, pairing and pruning
/// print a single status line each. The bar stays hidden until the batch
/// starts and is advanced directly from the worker threads.
pub struct CliReporter {
    bar: ProgressBar,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_select_complete(&self, snapshots: usize) {
        eprintln!("  \x1b[32m✓\x1b[0m {} snapshot directories found", snapshots);
    }

    fn on_pairing_complete(&self, pairs: usize) {
        eprintln!("  \x1b[32m✓\x1b[0m {} matching images", pairs);
    }

    fn on_compare_start(&self, total_pairs: usize) {
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            self.bar
                .set_style(style.progress_chars("━╸─").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        self.bar.set_length(total_pairs as u64);
        self.bar.set_position(0);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_compare_progress(&self, _completed: usize, _total_pairs: usize) {
        self.bar.inc(1);
    }

    fn on_compare_complete(&self, outcomes: usize, duration_secs: f64) {
        self.bar.finish_and_clear();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Comparison complete: {} results in {:.2}s",
            outcomes, duration_secs
        );
    }

    fn on_prune_complete(&self, removed: usize, failed: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Pruned {} snapshot directories ({} failed)",
            removed, failed
        );
    }
}

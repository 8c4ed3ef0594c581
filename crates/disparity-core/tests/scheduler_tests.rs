use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use disparity_core::scheduler::{ComparisonScheduler, WorkItem};
use disparity_core::{DiffOutcome, ProgressReporter, SilentReporter};

struct FakePair {
    path: PathBuf,
    percent: u8,
    panics: bool,
}

impl WorkItem for FakePair {
    fn source_path(&self) -> &Path {
        &self.path
    }
}

fn fake_pairs(count: usize) -> Vec<FakePair> {
    (0..count)
        .map(|i| FakePair {
            path: PathBuf::from(format!("/shots/old/{}.png", i)),
            percent: (i * 10) as u8,
            panics: false,
        })
        .collect()
}

fn fake_run(item: &FakePair) -> Vec<DiffOutcome> {
    if item.panics {
        panic!("decoder blew up on {}", item.path.display());
    }
    vec![DiffOutcome::Success {
        reference: item.path.clone(),
        comparison: item.path.clone(),
        output_path: item.path.clone(),
        percent_different: item.percent,
    }]
}

#[test]
fn test_empty_batch_reports_no_images() {
    let scheduler = ComparisonScheduler::new(4);
    let items: Vec<FakePair> = Vec::new();
    let outcomes = scheduler.run_all(Path::new("/shots"), &items, fake_run, &SilentReporter);

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_success());
    assert!(outcomes[0].message().contains("No images to compare"));
    assert_eq!(outcomes[0].source_path(), Path::new("/shots"));
}

#[test]
fn test_panicking_item_does_not_lose_outcomes() {
    let mut items = fake_pairs(8);
    items[3].panics = true;

    let scheduler = ComparisonScheduler::new(3);
    let outcomes = scheduler.run_all(Path::new("/shots"), &items, fake_run, &SilentReporter);

    assert_eq!(outcomes.len(), 8);
    let failures: Vec<&DiffOutcome> = outcomes.iter().filter(|o| !o.is_success()).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source_path(), Path::new("/shots/old/3.png"));
    assert!(failures[0].message().contains("decoder blew up"));

    for (i, item) in items.iter().enumerate().filter(|(i, _)| *i != 3) {
        let found = outcomes
            .iter()
            .find(|o| o.source_path() == item.path)
            .unwrap_or_else(|| panic!("missing outcome for item {}", i));
        assert_eq!(found.percent_different(), Some(item.percent));
    }
}

#[test]
fn test_multiple_outcomes_per_item_are_merged() {
    let items = fake_pairs(5);
    let scheduler = ComparisonScheduler::new(2);
    let outcomes = scheduler.run_all(
        Path::new("/shots"),
        &items,
        |item: &FakePair| {
            let mut out = fake_run(item);
            out.push(DiffOutcome::failure(&item.path, "second unit"));
            out
        },
        &SilentReporter,
    );
    assert_eq!(outcomes.len(), 10);
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 5);
}

#[test]
fn test_pool_size_bounds_concurrency() {
    let items = fake_pairs(12);
    let running = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);

    let scheduler = ComparisonScheduler::new(2);
    let outcomes = scheduler.run_all(
        Path::new("/shots"),
        &items,
        |item: &FakePair| {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(15));
            running.fetch_sub(1, Ordering::SeqCst);
            fake_run(item)
        },
        &SilentReporter,
    );

    assert_eq!(outcomes.len(), 12);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[test]
fn test_zero_workers_still_runs() {
    let scheduler = ComparisonScheduler::new(0);
    assert_eq!(scheduler.workers(), 1);
    let outcomes = scheduler.run_all(Path::new("/shots"), &fake_pairs(3), fake_run, &SilentReporter);
    assert_eq!(outcomes.len(), 3);
}

#[derive(Default)]
struct CountingReporter {
    started: AtomicUsize,
    progress_calls: AtomicUsize,
    last_completed: AtomicUsize,
}

impl ProgressReporter for CountingReporter {
    fn on_compare_start(&self, total_pairs: usize) {
        self.started.store(total_pairs, Ordering::SeqCst);
    }

    fn on_compare_progress(&self, completed: usize, _total_pairs: usize) {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        self.last_completed.fetch_max(completed, Ordering::SeqCst);
    }
}

#[test]
fn test_progress_reported_per_item() {
    let reporter = CountingReporter::default();
    let scheduler = ComparisonScheduler::new(4);
    scheduler.run_all(Path::new("/shots"), &fake_pairs(6), fake_run, &reporter);

    assert_eq!(reporter.started.load(Ordering::SeqCst), 6);
    assert_eq!(reporter.progress_calls.load(Ordering::SeqCst), 6);
    assert_eq!(reporter.last_completed.load(Ordering::SeqCst), 6);
}

use crate::snapshot::{Endpoints, SnapshotDirectory};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Snapshots strictly between the two endpoints of a sorted snapshot list.
pub fn prune_candidates<'a>(
    snapshots: &'a [SnapshotDirectory],
    endpoints: &Endpoints,
) -> Vec<&'a SnapshotDirectory> {
    snapshots
        .iter()
        .filter(|s| s.name > endpoints.oldest.name && s.name < endpoints.newest.name)
        .collect()
}

/// Delete every snapshot between the endpoints. Endpoints and directories that
/// never matched the snapshot pattern are left alone. Failures are collected,
/// not raised.
pub fn prune_between(snapshots: &[SnapshotDirectory], endpoints: &Endpoints) -> PruneReport {
    let mut report = PruneReport::default();

    for snapshot in prune_candidates(snapshots, endpoints) {
        if !snapshot.path.exists() {
            warn!("Snapshot '{}' no longer exists, skipping", snapshot.path.display());
            continue;
        }

        match fs::remove_dir_all(&snapshot.path) {
            Ok(()) => {
                debug!("removed: {}", snapshot.path.display());
                report.removed.push(snapshot.path.clone());
            }
            Err(e) => {
                error!("Failed to remove '{}': {}", snapshot.path.display(), e);
                report.failed.push((snapshot.path.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Prune complete: {} removed, {} failed",
        report.removed.len(),
        report.failed.len()
    );
    report
}

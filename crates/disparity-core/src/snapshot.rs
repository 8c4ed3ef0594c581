use crate::config::SingleSnapshotPolicy;
use chrono::NaiveDateTime;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// A capture directory directly under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDirectory {
    pub path: PathBuf,
    pub name: String,
    /// Capture time, when the name is a `yyyy-MM-dd HH-mm-ss` timestamp.
    pub timestamp: Option<NaiveDateTime>,
}

impl SnapshotDirectory {
    fn new(path: PathBuf, name: String) -> Self {
        let timestamp = NaiveDateTime::parse_from_str(&name, TIMESTAMP_FORMAT).ok();
        Self {
            path,
            name,
            timestamp,
        }
    }
}

/// The oldest and newest snapshots; these are the two sides of every comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub oldest: SnapshotDirectory,
    pub newest: SnapshotDirectory,
}

impl Endpoints {
    pub fn is_self_comparison(&self) -> bool {
        self.oldest.path == self.newest.path
    }
}

/// Compile a directory-name pattern so that it only accepts whole names.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Immediate child directories of `root` whose names fully match `pattern`,
/// sorted by name. A missing or unreadable root gives an empty list.
pub fn select_snapshot_dirs(root: &Path, pattern: &Regex) -> Vec<SnapshotDirectory> {
    if !root.is_dir() {
        warn!("Input directory '{}' is not readable", root.display());
        return Vec::new();
    }

    let mut snapshots: Vec<SnapshotDirectory> = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry under '{}': {}", root.display(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if pattern.is_match(&name) {
                Some(SnapshotDirectory::new(entry.into_path(), name))
            } else {
                debug!("Ignoring directory '{}'", name);
                None
            }
        })
        .collect();

    snapshots.sort_by(|a, b| a.name.cmp(&b.name));
    snapshots
}

/// Pick the first and last snapshot of a sorted list.
pub fn select_endpoints(
    snapshots: &[SnapshotDirectory],
    policy: SingleSnapshotPolicy,
) -> Option<Endpoints> {
    let (oldest, newest) = (snapshots.first()?, snapshots.last()?);
    if snapshots.len() == 1 && policy == SingleSnapshotPolicy::Skip {
        return None;
    }
    Some(Endpoints {
        oldest: oldest.clone(),
        newest: newest.clone(),
    })
}

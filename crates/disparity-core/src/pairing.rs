use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// The same screenshot captured in two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Path relative to its snapshot directory, `/`-separated.
    pub relative_name: String,
    /// File in the older snapshot.
    pub reference: PathBuf,
    /// File in the newer snapshot.
    pub comparison: PathBuf,
}

/// Map of relative name → absolute path for the files under `dir`.
///
/// Only the top level is listed unless `recursive` is set, in which case keys
/// carry the subpath. Unreadable directories yield an empty map.
pub fn list_files(dir: &Path, recursive: bool) -> BTreeMap<String, PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error listing '{}': {}", dir.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        files.insert(relative_key(relative), entry.into_path());
    }

    files
}

fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Pair every file name present in both directories. Files that exist on only
/// one side are dropped without a diagnostic.
pub fn pair_files(reference_dir: &Path, comparison_dir: &Path, recursive: bool) -> Vec<FilePair> {
    let reference_files = list_files(reference_dir, recursive);
    let mut comparison_files = list_files(comparison_dir, recursive);

    reference_files
        .into_iter()
        .filter_map(|(name, reference)| {
            let comparison = comparison_files.remove(&name)?;
            Some(FilePair {
                relative_name: name,
                reference,
                comparison,
            })
        })
        .collect()
}

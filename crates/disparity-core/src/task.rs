use crate::diff::{self, decode_image, encode_diff};
use crate::error::Error;
use crate::outcome::DiffOutcome;
use crate::pairing::FilePair;
use crate::scheduler::WorkItem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One file pair, ready to be compared on any worker.
#[derive(Debug, Clone)]
pub struct ComparisonTask {
    pub pair: FilePair,
    pub output_path: PathBuf,
    pub fuzziness: u32,
}

impl ComparisonTask {
    pub fn new(pair: FilePair, diff_dir: &Path, fuzziness: u32) -> Self {
        let output_path = diff::diff_output_path(diff_dir, &pair.relative_name);
        Self {
            pair,
            output_path,
            fuzziness,
        }
    }

    /// Compare the pair. Errors are folded into a failure outcome; nothing escapes.
    pub fn run(&self) -> Vec<DiffOutcome> {
        let outcome = match self.compare() {
            Ok(percent_different) => {
                debug!(
                    "'{}' differs by {}%",
                    self.pair.relative_name, percent_different
                );
                DiffOutcome::Success {
                    reference: self.pair.reference.clone(),
                    comparison: self.pair.comparison.clone(),
                    output_path: self.output_path.clone(),
                    percent_different,
                }
            }
            Err(e) => {
                warn!("Failed to compare '{}': {}", self.pair.relative_name, e);
                DiffOutcome::failure(
                    &self.pair.reference,
                    format!("{}: {}", self.pair.relative_name, e),
                )
            }
        };
        vec![outcome]
    }

    fn compare(&self) -> Result<u8, Error> {
        debug!(
            "Compare images '{}' & '{}'",
            self.pair.reference.display(),
            self.pair.comparison.display()
        );
        let reference = decode_image(&self.pair.reference)?;
        let comparison = decode_image(&self.pair.comparison)?;
        let result = diff::diff_images(&reference, &comparison, self.fuzziness);
        encode_diff(&result.raster, &self.output_path)?;
        Ok(result.percent_different)
    }
}

impl WorkItem for ComparisonTask {
    fn source_path(&self) -> &Path {
        &self.pair.reference
    }
}

use serde::Serialize;
use std::path::{Path, PathBuf};

pub const NO_IMAGES_MESSAGE: &str = "No images to compare!";

/// Result of comparing one file pair. Created once by the task that ran it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    Success {
        reference: PathBuf,
        comparison: PathBuf,
        output_path: PathBuf,
        percent_different: u8,
    },
    Failure {
        source: PathBuf,
        reason: String,
    },
}

impl DiffOutcome {
    pub fn failure(source: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Failure {
            source: source.into(),
            reason: reason.into(),
        }
    }

    /// Outcome reported when pairing found nothing to compare.
    pub fn no_images(input_root: &Path) -> Self {
        let source = std::path::absolute(input_root).unwrap_or_else(|_| input_root.to_path_buf());
        Self::failure(source, NO_IMAGES_MESSAGE)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn source_path(&self) -> &Path {
        match self {
            Self::Success { reference, .. } => reference,
            Self::Failure { source, .. } => source,
        }
    }

    pub fn percent_different(&self) -> Option<u8> {
        match self {
            Self::Success {
                percent_different, ..
            } => Some(*percent_different),
            Self::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Success {
                percent_different, ..
            } => format!("Image Difference: {}% of pixels differ", percent_different),
            Self::Failure { reason, .. } => format!("Image Difference Error: {}", reason),
        }
    }
}

/// Flat record handed to reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub source_path: String,
    pub success: bool,
    pub message: String,
}

impl From<&DiffOutcome> for ResultRecord {
    fn from(outcome: &DiffOutcome) -> Self {
        Self {
            source_path: outcome.source_path().to_string_lossy().into_owned(),
            success: outcome.is_success(),
            message: outcome.message(),
        }
    }
}

pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod pairing;
pub mod progress;
pub mod prune;
pub mod scheduler;
pub mod snapshot;
pub mod task;

pub use config::{AppConfig, ConfigOverrides, SingleSnapshotPolicy};
pub use engine::{DisparityEngine, RunResult};
pub use error::Error;
pub use outcome::{DiffOutcome, ResultRecord};
pub use progress::{ProgressReporter, SilentReporter};

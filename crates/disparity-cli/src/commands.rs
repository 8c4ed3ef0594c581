use clap::{Args, Parser, Subcommand};
use disparity_core::ConfigOverrides;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "disparity")]
#[command(about = "Diff the oldest and newest screenshot snapshots", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Command-line values layered over `Disparity.toml` and `DISPARITY_*` variables.
#[derive(Debug, Args)]
pub struct Settings {
    /// Configuration file to load instead of ./Disparity.*
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Root directory holding the snapshot directories
    #[arg(long = "in", global = true)]
    pub input: Option<String>,
    /// Directory the `diff/` folder is written to
    #[arg(long = "out", global = true)]
    pub output: Option<String>,
    /// Size of the comparison worker pool
    #[arg(long, global = true)]
    pub threads: Option<u64>,
    /// Per-channel tolerance subtracted before a pixel counts as different
    #[arg(long, global = true)]
    pub fuzziness: Option<u64>,
    /// Regular expression snapshot directory names must fully match
    #[arg(long, global = true)]
    pub pattern: Option<String>,
    /// Delete the snapshots between the oldest and newest after comparing
    #[arg(long, global = true)]
    pub prune: bool,
    /// Pair files in nested directories too
    #[arg(long, global = true)]
    pub recursive: bool,
}

impl Settings {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            threads: self.threads,
            fuzziness: self.fuzziness,
            dir_pattern: self.pattern.clone(),
            prune: self.prune.then_some(true),
            recursive: self.recursive.then_some(true),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare the oldest and newest snapshots and write difference images
    Compare {
        /// Write the result records to a CSV file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List the snapshot directories and the chosen endpoints
    Snapshots,
    /// Print configuration values
    PrintConfig,
}

use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Matches `yyyy-MM-dd HH-mm-ss` snapshot directory names.
pub const DEFAULT_DIR_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}\s\d{2}-\d{2}-\d{2}$";
pub const DEFAULT_THREADS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingleSnapshotPolicy {
    /// One snapshot is both endpoints; every pair is compared with itself.
    #[default]
    SelfCompare,
    /// One snapshot yields no endpoints and nothing is compared.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "in")]
    pub input: PathBuf,
    #[serde(rename = "out")]
    pub output: PathBuf,
    pub threads: usize,
    #[serde(rename = "fuzzyness")]
    pub fuzziness: u32,
    pub dir_pattern: String,
    pub prune: bool,
    pub recursive: bool,
    pub single_snapshot: SingleSnapshotPolicy,
}

impl AppConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            threads: DEFAULT_THREADS,
            fuzziness: 0,
            dir_pattern: DEFAULT_DIR_PATTERN.to_string(),
            prune: false,
            recursive: false,
            single_snapshot: SingleSnapshotPolicy::default(),
        }
    }

    /// Worker count actually used by the scheduler.
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }

    /// Directory that receives the difference images.
    pub fn diff_dir(&self) -> PathBuf {
        self.output.join("diff")
    }
}

/// Values supplied on the command line. Each `Some` wins over every other source.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub threads: Option<u64>,
    pub fuzziness: Option<u64>,
    pub dir_pattern: Option<String>,
    pub prune: Option<bool>,
    pub recursive: Option<bool>,
}

pub fn load_configuration(overrides: &ConfigOverrides) -> Result<AppConfig, ConfigError> {
    let file_source = match &overrides.config_file {
        Some(path) => ConfigFile::from(path.as_path()).required(true),
        None => ConfigFile::with_name("Disparity").required(false),
    };

    let builder = Config::builder()
        .set_default("threads", DEFAULT_THREADS as u64)?
        .set_default("fuzzyness", 0u64)?
        .set_default("dir_pattern", DEFAULT_DIR_PATTERN)?
        .set_default("prune", false)?
        .set_default("recursive", false)?
        .set_default("single_snapshot", "self-compare")?
        .add_source(file_source)
        .add_source(Environment::with_prefix("DISPARITY").try_parsing(true))
        .set_override_option("in", overrides.input.clone())?
        .set_override_option("out", overrides.output.clone())?
        .set_override_option("threads", overrides.threads)?
        .set_override_option("fuzzyness", overrides.fuzziness)?
        .set_override_option("dir_pattern", overrides.dir_pattern.clone())?
        .set_override_option("prune", overrides.prune)?
        .set_override_option("recursive", overrides.recursive)?
        .build()?;

    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(input: &str, output: &str) -> ConfigOverrides {
        ConfigOverrides {
            input: Some(input.to_string()),
            output: Some(output.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_configuration(&overrides("/shots", "/report")).unwrap();
        assert_eq!(config.input, PathBuf::from("/shots"));
        assert_eq!(config.output, PathBuf::from("/report"));
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert_eq!(config.fuzziness, 0);
        assert_eq!(config.dir_pattern, DEFAULT_DIR_PATTERN);
        assert!(!config.prune);
        assert!(!config.recursive);
        assert_eq!(config.single_snapshot, SingleSnapshotPolicy::SelfCompare);
    }

    #[test]
    fn test_overrides_win() {
        let mut o = overrides("/shots", "/report");
        o.threads = Some(3);
        o.fuzziness = Some(12);
        o.prune = Some(true);
        o.dir_pattern = Some(r"run-\d+".to_string());
        let config = load_configuration(&o).unwrap();
        assert_eq!(config.threads, 3);
        assert_eq!(config.fuzziness, 12);
        assert!(config.prune);
        assert_eq!(config.dir_pattern, r"run-\d+");
    }

    #[test]
    fn test_missing_input_is_error() {
        let o = ConfigOverrides {
            output: Some("/report".to_string()),
            ..Default::default()
        };
        assert!(load_configuration(&o).is_err());
    }

    #[test]
    fn test_config_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "in = \"/a\"\nout = \"/b\"\nthreads = 4\nfuzzyness = 7\nsingle_snapshot = \"skip\"\n",
        )
        .unwrap();
        let o = ConfigOverrides {
            config_file: Some(path),
            ..Default::default()
        };
        let config = load_configuration(&o).unwrap();
        assert_eq!(config.input, PathBuf::from("/a"));
        assert_eq!(config.threads, 4);
        assert_eq!(config.fuzziness, 7);
        assert_eq!(config.single_snapshot, SingleSnapshotPolicy::Skip);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let mut config = AppConfig::new("/a", "/b");
        config.threads = 0;
        assert_eq!(config.worker_count(), 1);
        assert_eq!(config.diff_dir(), PathBuf::from("/b/diff"));
    }
}

//! Ingestion configuration.
//!
//! Values come from three layers, highest precedence first: command-line
//! flags (or their environment variables), an optional YAML file, and
//! built-in defaults.
//!
//! ```yaml
//! dataset: kaggle:owner/helmet-detection
//! target_dir: artifacts
//! collisions: overwrite
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::IngestError;
use crate::hub::default_cache_dir;
use crate::ingest::CollisionPolicy;

/// Target root used when neither the CLI nor the config file names one.
pub const DEFAULT_TARGET_DIR: &str = "artifacts";

/// Contents of a YAML config file. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub dataset: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub revision: Option<String>,
    pub collisions: Option<CollisionPolicy>,
}

impl FileConfig {
    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let data = fs::read_to_string(path).map_err(|source| IngestError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&data, path)
    }

    fn from_yaml_str(data: &str, path: &Path) -> Result<Self, IngestError> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(data).map_err(|source| IngestError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub dataset: Option<String>,
    pub target_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub revision: Option<String>,
    pub collisions: Option<CollisionPolicy>,
}

/// Fully resolved settings for one ingestion run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    pub dataset: String,
    pub target_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub revision: Option<String>,
    pub collisions: CollisionPolicy,
}

impl IngestConfig {
    /// Merge overrides over the file config over defaults.
    pub fn resolve(overrides: ConfigOverrides, file: FileConfig) -> Result<Self, IngestError> {
        let dataset = overrides
            .dataset
            .or(file.dataset)
            .filter(|value| !value.trim().is_empty())
            .ok_or(IngestError::MissingConfig(
                "dataset (pass --dataset, set YOLO_INGEST_DATASET, or add `dataset:` to the config file)",
            ))?;

        Ok(Self {
            dataset,
            target_dir: overrides
                .target_dir
                .or(file.target_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR)),
            cache_dir: overrides
                .cache_dir
                .or(file.cache_dir)
                .unwrap_or_else(default_cache_dir),
            revision: overrides.revision.or(file.revision),
            collisions: overrides
                .collisions
                .or(file.collisions)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Result<FileConfig, IngestError> {
        FileConfig::from_yaml_str(data, Path::new("ingest.yaml"))
    }

    #[test]
    fn yaml_file_is_parsed() {
        let file = parse(
            "dataset: kaggle:owner/helmets\ntarget_dir: out\ncollisions: fail\nrevision: \"2\"\n",
        )
        .expect("parse");

        assert_eq!(file.dataset.as_deref(), Some("kaggle:owner/helmets"));
        assert_eq!(file.target_dir, Some(PathBuf::from("out")));
        assert_eq!(file.collisions, Some(CollisionPolicy::Fail));
        assert_eq!(file.revision.as_deref(), Some("2"));
        assert_eq!(file.cache_dir, None);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse("  \n").expect("parse"), FileConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("dataset: a/b\ntarget: out\n").expect_err("should fail");
        assert!(matches!(err, IngestError::ConfigParse { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let file = FileConfig {
            dataset: Some("owner/from-file".to_string()),
            target_dir: Some(PathBuf::from("file-target")),
            cache_dir: Some(PathBuf::from("file-cache")),
            revision: None,
            collisions: Some(CollisionPolicy::Fail),
        };
        let overrides = ConfigOverrides {
            dataset: Some("owner/from-cli".to_string()),
            collisions: Some(CollisionPolicy::Overwrite),
            ..Default::default()
        };

        let config = IngestConfig::resolve(overrides, file).expect("resolve");
        assert_eq!(config.dataset, "owner/from-cli");
        assert_eq!(config.target_dir, PathBuf::from("file-target"));
        assert_eq!(config.cache_dir, PathBuf::from("file-cache"));
        assert_eq!(config.collisions, CollisionPolicy::Overwrite);
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let overrides = ConfigOverrides {
            dataset: Some("owner/set".to_string()),
            ..Default::default()
        };
        let config = IngestConfig::resolve(overrides, FileConfig::default()).expect("resolve");
        assert_eq!(config.target_dir, PathBuf::from(DEFAULT_TARGET_DIR));
        assert_eq!(config.collisions, CollisionPolicy::Overwrite);
        assert_eq!(config.revision, None);
    }

    #[test]
    fn dataset_is_required() {
        let err = IngestConfig::resolve(ConfigOverrides::default(), FileConfig::default())
            .expect_err("should fail");
        assert!(matches!(err, IngestError::MissingConfig(_)));
    }
}

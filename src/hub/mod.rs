//! Dataset hub clients.
//!
//! A hub turns a dataset identifier into a local path: either a directory
//! tree or a `.zip` archive. Remote hubs cache what they download, so
//! repeated runs reuse earlier downloads.

#[cfg(feature = "hf-remote")]
pub mod hf;
#[cfg(feature = "kaggle")]
pub mod kaggle;
pub mod local;
pub mod resolve;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::IngestError;

pub use local::LocalHub;
pub use resolve::parse_dataset_ref;

/// Something that can fetch a dataset by identifier.
pub trait DatasetHub {
    /// Download `dataset` (or find it in a cache) and return its local path.
    fn download(&self, dataset: &str) -> Result<PathBuf, IngestError>;
}

impl<T: DatasetHub + ?Sized> DatasetHub for &T {
    fn download(&self, dataset: &str) -> Result<PathBuf, IngestError> {
        (**self).download(dataset)
    }
}

impl<T: DatasetHub + ?Sized> DatasetHub for Box<T> {
    fn download(&self, dataset: &str) -> Result<PathBuf, IngestError> {
        (**self).download(dataset)
    }
}

/// Where a dataset identifier points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HubSource {
    Kaggle,
    HuggingFace,
    Local,
}

/// Canonical reference to a dataset on some hub.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetRef {
    pub source: HubSource,
    /// `owner/name` for remote hubs, a filesystem path for local datasets.
    pub id: String,
    /// Kaggle version number or Hugging Face git revision.
    pub revision: Option<String>,
}

/// Hub that dispatches on the identifier form to Kaggle, Hugging Face or the
/// local filesystem.
#[derive(Clone, Debug)]
pub struct RemoteHub {
    cache_dir: PathBuf,
    revision: Option<String>,
    #[cfg_attr(not(feature = "hf-remote"), allow(dead_code))]
    hf_token: Option<String>,
}

impl RemoteHub {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            revision: None,
            hf_token: None,
        }
    }

    /// Pin a revision for every identifier this hub resolves.
    #[must_use]
    pub fn with_revision(mut self, revision: Option<String>) -> Self {
        self.revision = revision;
        self
    }

    /// Token for private or gated Hugging Face datasets.
    #[must_use]
    pub fn with_hf_token(mut self, token: Option<String>) -> Self {
        self.hf_token = token;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[cfg(feature = "kaggle")]
    fn download_kaggle(&self, reference: &DatasetRef) -> Result<PathBuf, IngestError> {
        if let Some(archive) = kaggle::cached_archive(&self.cache_dir, reference) {
            return Ok(archive);
        }
        let credentials = kaggle::KaggleCredentials::discover()?;
        kaggle::download_archive(reference, &credentials, &self.cache_dir)
    }

    #[cfg(not(feature = "kaggle"))]
    fn download_kaggle(&self, _reference: &DatasetRef) -> Result<PathBuf, IngestError> {
        Err(IngestError::HubUnavailable {
            hub: "Kaggle",
            feature: "kaggle",
        })
    }

    #[cfg(feature = "hf-remote")]
    fn download_hf(&self, reference: &DatasetRef) -> Result<PathBuf, IngestError> {
        hf::download_snapshot(reference, &self.cache_dir, self.hf_token.as_deref())
    }

    #[cfg(not(feature = "hf-remote"))]
    fn download_hf(&self, _reference: &DatasetRef) -> Result<PathBuf, IngestError> {
        Err(IngestError::HubUnavailable {
            hub: "Hugging Face",
            feature: "hf-remote",
        })
    }
}

impl DatasetHub for RemoteHub {
    fn download(&self, dataset: &str) -> Result<PathBuf, IngestError> {
        let reference = parse_dataset_ref(dataset, self.revision.as_deref())?;
        info!(
            "Resolving {:?} dataset '{}'{}",
            reference.source,
            reference.id,
            reference
                .revision
                .as_deref()
                .map(|rev| format!(" at revision {rev}"))
                .unwrap_or_default()
        );

        match reference.source {
            HubSource::Local => local::resolve_local(&reference.id),
            HubSource::Kaggle => self.download_kaggle(&reference),
            HubSource::HuggingFace => self.download_hf(&reference),
        }
    }
}

/// Default download cache: `$XDG_CACHE_HOME/yolo-ingest`, then
/// `~/.cache/yolo-ingest`, then the system temp dir.
pub fn default_cache_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(local_app_data) = std::env::var("LOCALAPPDATA") {
            return PathBuf::from(local_app_data)
                .join("yolo-ingest")
                .join("cache");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
            return PathBuf::from(xdg_cache).join("yolo-ingest");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".cache").join("yolo-ingest");
        }
    }

    std::env::temp_dir().join("yolo-ingest").join("cache")
}

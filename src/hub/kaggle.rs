//! Kaggle dataset downloads over the public REST API.
//!
//! Kaggle serves every dataset version as a single zip archive. Archives are
//! cached under `<cache>/kaggle/<owner>/<slug>/<version|latest>/<slug>.zip`;
//! a cached archive is returned without touching the network.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tracing::info;

use crate::error::IngestError;

use super::DatasetRef;

const KAGGLE_API_BASE: &str = "https://www.kaggle.com/api/v1";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);

/// Kaggle API username and key.
#[derive(Clone, Deserialize)]
pub struct KaggleCredentials {
    pub username: String,
    pub key: String,
}

impl std::fmt::Debug for KaggleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KaggleCredentials")
            .field("username", &self.username)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl KaggleCredentials {
    /// Look for `KAGGLE_USERNAME` + `KAGGLE_KEY`, then for `kaggle.json` in
    /// `$KAGGLE_CONFIG_DIR` or `~/.kaggle`.
    pub fn discover() -> Result<Self, IngestError> {
        if let (Ok(username), Ok(key)) =
            (std::env::var("KAGGLE_USERNAME"), std::env::var("KAGGLE_KEY"))
        {
            return Ok(Self { username, key });
        }

        let path = kaggle_json_path().ok_or_else(|| IngestError::HubCredentials {
            hub: "Kaggle",
            message: "set KAGGLE_USERNAME and KAGGLE_KEY or create ~/.kaggle/kaggle.json"
                .to_string(),
        })?;
        Self::from_file(&path)
    }

    /// Read a `kaggle.json` API token file.
    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        let data = fs::read_to_string(path).map_err(|source| IngestError::HubCredentials {
            hub: "Kaggle",
            message: format!("failed to read {}: {source}", path.display()),
        })?;
        serde_json::from_str(&data).map_err(|source| IngestError::HubCredentials {
            hub: "Kaggle",
            message: format!("failed to parse {}: {source}", path.display()),
        })
    }

    fn authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.key);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

fn kaggle_json_path() -> Option<PathBuf> {
    let dir = std::env::var_os("KAGGLE_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".kaggle")))?;
    Some(dir.join("kaggle.json"))
}

/// Download URL for a dataset archive.
pub fn download_url(reference: &DatasetRef) -> String {
    let mut url = format!("{}/datasets/download/{}", KAGGLE_API_BASE, reference.id);
    if let Some(version) = reference.revision.as_deref() {
        url.push_str("?datasetVersionNumber=");
        url.push_str(version);
    }
    url
}

/// Where the archive for `reference` is cached.
pub fn archive_path(cache_dir: &Path, reference: &DatasetRef) -> PathBuf {
    let (owner, slug) = reference
        .id
        .split_once('/')
        .unwrap_or(("", reference.id.as_str()));
    let version_dir = reference
        .revision
        .as_deref()
        .map(|version| format!("v{version}"))
        .unwrap_or_else(|| "latest".to_string());

    cache_dir
        .join("kaggle")
        .join(owner)
        .join(slug)
        .join(version_dir)
        .join(format!("{slug}.zip"))
}

/// The cached archive for `reference`, if an earlier run downloaded it.
pub fn cached_archive(cache_dir: &Path, reference: &DatasetRef) -> Option<PathBuf> {
    let archive = archive_path(cache_dir, reference);
    if archive.is_file() {
        info!("Using cached Kaggle archive {}", archive.display());
        Some(archive)
    } else {
        None
    }
}

/// Fetch the dataset archive, reusing the cached copy when present.
pub fn download_archive(
    reference: &DatasetRef,
    credentials: &KaggleCredentials,
    cache_dir: &Path,
) -> Result<PathBuf, IngestError> {
    if let Some(archive) = cached_archive(cache_dir, reference) {
        return Ok(archive);
    }
    let archive = archive_path(cache_dir, reference);

    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent).map_err(|source| IngestError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let url = download_url(reference);
    info!("Downloading Kaggle dataset '{}' from {}", reference.id, url);

    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(CONNECT_TIMEOUT))
        .timeout_recv_response(Some(RESPONSE_TIMEOUT))
        .build();
    let agent: ureq::Agent = config.into();

    let mut response = agent
        .get(url.as_str())
        .header("Authorization", &credentials.authorization_header())
        .call()
        .map_err(|source| download_error(reference, describe_error(&source)))?;

    let partial = archive.with_extension("zip.part");
    let write_error = |source: io::Error| IngestError::WriteFile {
        path: partial.clone(),
        source,
    };
    let mut file = fs::File::create(&partial).map_err(write_error)?;
    let mut body = response.body_mut().as_reader();
    let bytes = io::copy(&mut body, &mut file)
        .map_err(|source| download_error(reference, source.to_string()))?;
    file.sync_all().map_err(write_error)?;
    drop(file);
    fs::rename(&partial, &archive).map_err(|source| IngestError::Rename {
        from: partial.clone(),
        to: archive.clone(),
        source,
    })?;

    info!("Saved {} bytes to {}", bytes, archive.display());
    Ok(archive)
}

fn describe_error(source: &ureq::Error) -> String {
    match source {
        ureq::Error::StatusCode(401) | ureq::Error::StatusCode(403) => {
            "access denied (check the Kaggle credentials and dataset visibility)".to_string()
        }
        ureq::Error::StatusCode(404) => "dataset or version not found".to_string(),
        other => other.to_string(),
    }
}

fn download_error(reference: &DatasetRef, message: String) -> IngestError {
    IngestError::HubDownload {
        dataset: reference.id.clone(),
        file: format!("{}.zip", reference.id),
        message,
    }
}

//! One-shot zip extraction next to the downloaded archive.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::IngestError;

/// What happened to the dataset path before classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveOutcome {
    /// The hub returned a directory; nothing to unpack.
    NotArchive,
    /// The archive was unpacked during this run.
    Extracted,
    /// The extraction directory already existed, so unpacking was skipped.
    AlreadyExtracted,
}

/// Returns true when `path` is a regular file with a `.zip` extension.
pub fn is_zip_archive(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false)
}

/// Directory an archive unpacks into: the archive path without `.zip`.
pub fn extraction_dir(archive: &Path) -> PathBuf {
    archive.with_extension("")
}

/// Unpack `archive` into its extraction directory unless that directory
/// already exists.
///
/// The archive is unpacked into a `<name>.partial` sibling first and renamed
/// into place once complete, so a crashed extraction never counts as done.
/// Returns the extraction directory and whether work was done.
pub fn extract_once(archive: &Path) -> Result<(PathBuf, ArchiveOutcome), IngestError> {
    let target = extraction_dir(archive);
    if target.exists() {
        info!(
            "Extraction directory {} already exists, skipping unzip",
            target.display()
        );
        return Ok((target, ArchiveOutcome::AlreadyExtracted));
    }

    let staging = staging_dir(&target);
    if staging.exists() {
        debug!("removing stale staging dir {}", staging.display());
        fs::remove_dir_all(&staging).map_err(|source| IngestError::ResetDir {
            path: staging.clone(),
            source,
        })?;
    }

    let file = fs::File::open(archive).map_err(|source| IngestError::OpenFile {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file).map_err(|source| IngestError::Zip {
        path: archive.to_path_buf(),
        source,
    })?;

    info!(
        "Unzipping {} ({} entries) into {}",
        archive.display(),
        zip.len(),
        target.display()
    );
    fs::create_dir_all(&staging).map_err(|source| IngestError::CreateDir {
        path: staging.clone(),
        source,
    })?;
    zip.extract(&staging).map_err(|source| IngestError::Zip {
        path: archive.to_path_buf(),
        source,
    })?;
    fs::rename(&staging, &target).map_err(|source| IngestError::Rename {
        from: staging.clone(),
        to: target.clone(),
        source,
    })?;

    Ok((target, ArchiveOutcome::Extracted))
}

fn staging_dir(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}

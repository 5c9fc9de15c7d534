//! Extension-based collection of YOLO images and labels.
//!
//! Walks an arbitrary source tree once and copies every image into the flat
//! `Images/` bucket and every label into the flat `Labels/` bucket. Directory
//! structure below the source root is discarded.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::IngestError;

/// Name suffixes (lowercase) that classify a file as an image.
pub const IMAGE_SUFFIXES: [&str; 3] = [".jpg", ".jpeg", ".png"];
/// Name suffixes (lowercase) that classify a file as a label.
pub const LABEL_SUFFIXES: [&str; 1] = [".txt"];

/// Bucket a file name falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Label,
    Other,
}

/// Classify a file name by its lowercased suffix.
pub fn classify_file_name(name: &str) -> FileKind {
    let lower = name.to_lowercase();
    if IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        FileKind::Image
    } else if LABEL_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        FileKind::Label
    } else {
        FileKind::Other
    }
}

/// What to do when two source files map to the same destination name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later files (in traversal order) replace earlier ones.
    #[default]
    Overwrite,
    /// Abort the run on the first collision.
    Fail,
}

/// Counts produced by a single collection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectSummary {
    /// Image copies performed (including ones that replaced an earlier file).
    pub images: usize,
    /// Label copies performed (including ones that replaced an earlier file).
    pub labels: usize,
    /// Files ignored because of an unrecognized extension.
    pub skipped: usize,
    /// Copies that replaced a file copied earlier in the same pass.
    pub overwritten: usize,
}

/// Delete `path` if it exists and recreate it empty.
pub fn reset_dir(path: &Path) -> Result<(), IngestError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|source| IngestError::ResetDir {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::create_dir_all(path).map_err(|source| IngestError::ResetDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy images and labels found anywhere under `source` into the two
/// destination directories.
///
/// Destinations must already exist. Entries are visited depth-first in
/// file-name order, so last-writer-wins collisions resolve the same way on
/// every run. Destination directories that live inside `source` are skipped.
pub fn collect_yolo_files(
    source: &Path,
    images_dst: &Path,
    labels_dst: &Path,
    policy: CollisionPolicy,
) -> Result<CollectSummary, IngestError> {
    let excluded = [canonical_or_self(images_dst), canonical_or_self(labels_dst)];
    let root = canonical_or_self(source);

    let mut summary = CollectSummary::default();
    let mut seen_images: HashMap<OsString, PathBuf> = HashMap::new();
    let mut seen_labels: HashMap<OsString, PathBuf> = HashMap::new();

    let walker = WalkDir::new(&root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !excluded.iter().any(|dir| entry.path() == dir.as_path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_dead_link(&err) => {
                warn!("Skipping unreadable link: {}", err);
                summary.skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(IngestError::Walk {
                    path: root.clone(),
                    source,
                })
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let kind = classify_file_name(&file_name.to_string_lossy());
        let (dst_dir, seen) = match kind {
            FileKind::Image => (images_dst, &mut seen_images),
            FileKind::Label => (labels_dst, &mut seen_labels),
            FileKind::Other => {
                summary.skipped += 1;
                continue;
            }
        };

        if let Some(first) = seen.get(file_name) {
            match policy {
                CollisionPolicy::Overwrite => {
                    warn!(
                        "{} overwrites {} (same file name)",
                        entry.path().display(),
                        first.display()
                    );
                    summary.overwritten += 1;
                }
                CollisionPolicy::Fail => {
                    return Err(IngestError::Collision {
                        name: file_name.to_string_lossy().into_owned(),
                        first: first.clone(),
                        second: entry.path().to_path_buf(),
                    });
                }
            }
        }

        let dst = dst_dir.join(file_name);
        debug!("copying {} -> {}", entry.path().display(), dst.display());
        fs::copy(entry.path(), &dst).map_err(|source| IngestError::Copy {
            from: entry.path().to_path_buf(),
            to: dst.clone(),
            source,
        })?;
        seen.insert(file_name.to_os_string(), entry.path().to_path_buf());

        if kind == FileKind::Image {
            summary.images += 1;
        } else {
            summary.labels += 1;
        }
    }

    Ok(summary)
}

/// Symlink loops and links whose target is gone. Both are skipped rather
/// than failing the walk.
fn is_dead_link(err: &walkdir::Error) -> bool {
    if err.loop_ancestor().is_some() {
        return true;
    }
    let not_found = err
        .io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|path| fs::symlink_metadata(path).ok())
            .is_some_and(|meta| meta.file_type().is_symlink())
}

fn canonical_or_self(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

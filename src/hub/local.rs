//! Datasets that already sit on the local filesystem.

use std::path::PathBuf;

use crate::error::IngestError;

use super::DatasetHub;

/// Hub that treats every identifier as a filesystem path.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalHub;

impl DatasetHub for LocalHub {
    fn download(&self, dataset: &str) -> Result<PathBuf, IngestError> {
        resolve_local(dataset.strip_prefix("file:").unwrap_or(dataset))
    }
}

/// Expand a leading `~` and check the path exists.
pub fn resolve_local(path: &str) -> Result<PathBuf, IngestError> {
    let expanded = expand_home(path);
    if !expanded.exists() {
        return Err(IngestError::DatasetNotFound(expanded));
    }
    Ok(expanded)
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path {
        "~" => Some(""),
        _ => path.strip_prefix("~/"),
    };
    match (rest, std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

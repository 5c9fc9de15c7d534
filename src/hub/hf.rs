use std::path::{Path, PathBuf};

use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use tracing::{debug, info};

use crate::error::IngestError;

use super::DatasetRef;

/// Repository files that never carry dataset content.
const IGNORED_FILES: [&str; 1] = [".gitattributes"];

/// Download every file of a Hugging Face dataset repo into the hub cache.
///
/// Returns the snapshot directory, or the archive itself when the repo's only
/// content is a single `.zip` file.
pub fn download_snapshot(
    reference: &DatasetRef,
    cache_dir: &Path,
    token: Option<&str>,
) -> Result<PathBuf, IngestError> {
    let mut builder = ApiBuilder::new()
        .with_progress(false)
        .with_cache_dir(cache_dir.join("huggingface"));

    let token_from_env = std::env::var("HF_TOKEN").ok();
    let effective_token = token.map(str::to_string).or(token_from_env);
    if effective_token.is_some() {
        builder = builder.with_token(effective_token);
    }

    let api = builder.build().map_err(|source| IngestError::HubApi {
        dataset: reference.id.clone(),
        message: source.to_string(),
    })?;

    let repo = if let Some(revision) = reference.revision.as_ref() {
        api.repo(Repo::with_revision(
            reference.id.clone(),
            RepoType::Dataset,
            revision.clone(),
        ))
    } else {
        api.dataset(reference.id.clone())
    };

    let repo_info = repo.info().map_err(|source| IngestError::HubApi {
        dataset: reference.id.clone(),
        message: source.to_string(),
    })?;

    let files = dataset_files(
        repo_info
            .siblings
            .iter()
            .map(|sibling| sibling.rfilename.as_str()),
    );
    if files.is_empty() {
        return Err(IngestError::HubApi {
            dataset: reference.id.clone(),
            message: "dataset repository has no files".to_string(),
        });
    }

    info!(
        "Fetching {} file(s) from Hugging Face dataset '{}' (sha {})",
        files.len(),
        reference.id,
        repo_info.sha
    );

    let mut snapshot_dir = None;
    let mut local_paths = Vec::with_capacity(files.len());
    for remote_path in &files {
        let local = repo
            .get(remote_path)
            .map_err(|source| IngestError::HubDownload {
                dataset: reference.id.clone(),
                file: remote_path.clone(),
                message: source.to_string(),
            })?;
        debug!("{} -> {}", remote_path, local.display());

        if snapshot_dir.is_none() {
            snapshot_dir = snapshot_root(&local, remote_path);
        }
        local_paths.push(local);
    }

    if let [only] = local_paths.as_slice() {
        if is_zip_name(&files[0]) {
            return Ok(only.clone());
        }
    }

    snapshot_dir.ok_or_else(|| IngestError::HubApi {
        dataset: reference.id.clone(),
        message: "could not determine the local snapshot directory".to_string(),
    })
}

fn dataset_files<'a>(siblings: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut files: Vec<String> = siblings
        .filter(|path| !IGNORED_FILES.contains(path))
        .map(str::to_string)
        .collect();
    files.sort();
    files
}

/// Strip the repo-relative part of a downloaded path, leaving the snapshot
/// root it was placed under.
fn snapshot_root(local: &Path, remote_path: &str) -> Option<PathBuf> {
    let depth = remote_path.split('/').filter(|seg| !seg.is_empty()).count();
    local.ancestors().nth(depth).map(Path::to_path_buf)
}

fn is_zip_name(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

use std::path::Path;

use crate::error::IngestError;

use super::{DatasetRef, HubSource};

/// Parse a user-supplied dataset identifier.
///
/// Accepted forms:
/// - `kaggle:owner/slug[@version]`, a Kaggle dataset URL, or bare `owner/slug`
/// - `hf:namespace/name[@revision]` or a Hugging Face dataset URL
/// - `file:<path>` or anything that looks like a path (`/`, `./`, `../`, `~/`)
///
/// `revision` is an explicit override (e.g. from `--revision`); it must agree
/// with any revision encoded in the identifier itself.
pub fn parse_dataset_ref(input: &str, revision: Option<&str>) -> Result<DatasetRef, IngestError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(resolve_error(input, "dataset identifier is empty"));
    }

    if let Some(path) = trimmed.strip_prefix("file:") {
        return local_ref(input, path, revision);
    }
    if looks_like_path(trimmed) {
        return local_ref(input, trimmed, revision);
    }

    let (source, repo_id, embedded) =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            parse_dataset_url(trimmed)?
        } else if let Some(rest) = trimmed.strip_prefix("hf:") {
            let (repo, rev) = split_revision(rest);
            (HubSource::HuggingFace, validate_repo_id(repo)?, rev)
        } else {
            let rest = trimmed.strip_prefix("kaggle:").unwrap_or(trimmed);
            let (repo, rev) = split_revision(rest);
            (HubSource::Kaggle, validate_repo_id(repo)?, rev)
        };

    let merged = merge_revision(input, revision, embedded.as_deref())?;
    if source == HubSource::Kaggle {
        if let Some(version) = merged.as_deref() {
            if version.parse::<u32>().is_err() {
                return Err(resolve_error(
                    input,
                    format!("Kaggle dataset versions are numeric, got '{version}'"),
                ));
            }
        }
    }

    Ok(DatasetRef {
        source,
        id: repo_id,
        revision: merged,
    })
}

/// Fuzzing entry point for identifier parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_dataset_ref(input: &str) -> Result<(), IngestError> {
    parse_dataset_ref(input, None).map(|_| ())
}

fn looks_like_path(input: &str) -> bool {
    input == "."
        || input == "~"
        || input.starts_with("./")
        || input.starts_with("../")
        || input.starts_with("~/")
        || Path::new(input).is_absolute()
}

fn local_ref(input: &str, path: &str, revision: Option<&str>) -> Result<DatasetRef, IngestError> {
    if path.trim().is_empty() {
        return Err(resolve_error(input, "local dataset path is empty"));
    }
    if revision.is_some() {
        return Err(resolve_error(
            input,
            "revisions do not apply to local datasets",
        ));
    }
    Ok(DatasetRef {
        source: HubSource::Local,
        id: path.trim().to_string(),
        revision: None,
    })
}

fn split_revision(input: &str) -> (&str, Option<String>) {
    match input.rsplit_once('@') {
        Some((repo, rev)) => (repo, Some(rev.to_string())),
        None => (input, None),
    }
}

fn merge_revision(
    input: &str,
    explicit: Option<&str>,
    embedded: Option<&str>,
) -> Result<Option<String>, IngestError> {
    match (explicit, embedded) {
        (_, Some("")) => Err(resolve_error(input, "revision after '@' is empty")),
        (Some(arg), Some(from_ref)) if arg != from_ref => Err(resolve_error(
            input,
            format!(
                "conflicting revisions: --revision='{}' but identifier encodes revision='{}'",
                arg, from_ref
            ),
        )),
        (Some(arg), _) => Ok(Some(arg.to_string())),
        (None, Some(from_ref)) => Ok(Some(from_ref.to_string())),
        (None, None) => Ok(None),
    }
}

fn parse_dataset_url(input: &str) -> Result<(HubSource, String, Option<String>), IngestError> {
    let url = url::Url::parse(input)
        .map_err(|source| resolve_error(input, format!("invalid URL: {source}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| resolve_error(input, "URL is missing a host"))?
        .to_ascii_lowercase();

    let segments: Vec<&str> = url
        .path_segments()
        .map(|iter| iter.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let (source, marker) = match host.as_str() {
        "huggingface.co" => (HubSource::HuggingFace, "tree"),
        "kaggle.com" | "www.kaggle.com" => (HubSource::Kaggle, "versions"),
        other => {
            return Err(resolve_error(
                input,
                format!("expected host 'huggingface.co' or 'www.kaggle.com', found '{other}'"),
            ));
        }
    };

    if segments.len() < 3 || segments[0] != "datasets" {
        return Err(resolve_error(
            input,
            format!("expected dataset URL like https://{host}/datasets/<owner>/<dataset>"),
        ));
    }

    let repo_id = validate_repo_id(&format!("{}/{}", segments[1], segments[2]))?;
    let revision = if segments.get(3) == Some(&marker) {
        segments.get(4).map(|value| (*value).to_string())
    } else {
        None
    };

    Ok((source, repo_id, revision))
}

fn validate_repo_id(repo_id: &str) -> Result<String, IngestError> {
    let trimmed = repo_id.trim();
    let mut parts = trimmed.split('/');
    let namespace = parts.next().unwrap_or_default();
    let dataset = parts.next().unwrap_or_default();
    let extra = parts.next();

    if namespace.is_empty() || dataset.is_empty() || extra.is_some() {
        return Err(resolve_error(
            repo_id,
            "expected dataset id in '<owner>/<dataset>' form",
        ));
    }

    Ok(trimmed.to_string())
}

fn resolve_error(input: &str, message: impl Into<String>) -> IngestError {
    IngestError::HubResolve {
        input: input.to_string(),
        message: message.into(),
    }
}

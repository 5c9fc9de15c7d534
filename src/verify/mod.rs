//! Verification of an ingested raw directory.
//!
//! Checks that `Images/` and `Labels/` exist, are non-empty and hold only
//! files of their kind, and flags images and labels whose stems have no
//! partner in the other bucket.

mod report;

pub use report::{IssueCode, LayoutIssue, LayoutReport, Severity};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IngestError;
use crate::ingest::collect::{classify_file_name, FileKind};
use crate::ingest::{IMAGES_DIR_NAME, LABELS_DIR_NAME};

/// Options for verification behavior.
#[derive(Clone, Debug, Default)]
pub struct VerifyOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Inspect `raw_dir` and report every layout issue found.
///
/// Only I/O failures while listing a bucket are returned as errors; layout
/// problems end up in the report. With `strict`, the report only passes when
/// it holds no warnings either.
pub fn verify_raw_dir(raw_dir: &Path, opts: &VerifyOptions) -> Result<LayoutReport, IngestError> {
    let mut report = LayoutReport::new(raw_dir);
    report.strict = opts.strict;

    let images = scan_bucket(
        &raw_dir.join(IMAGES_DIR_NAME),
        FileKind::Image,
        &mut report,
    )?;
    let labels = scan_bucket(
        &raw_dir.join(LABELS_DIR_NAME),
        FileKind::Label,
        &mut report,
    )?;

    report.images = images.as_ref().map(Vec::len).unwrap_or(0);
    report.labels = labels.as_ref().map(Vec::len).unwrap_or(0);

    if let (Some(images), Some(labels)) = (images, labels) {
        check_pairing(&images, &labels, &mut report);
    }

    Ok(report)
}

/// List the matching files of one bucket. `None` when the bucket is missing.
fn scan_bucket(
    dir: &Path,
    expected: FileKind,
    report: &mut LayoutReport,
) -> Result<Option<Vec<PathBuf>>, IngestError> {
    if !dir.is_dir() {
        report.add(LayoutIssue::error(
            IssueCode::MissingDirectory,
            "directory does not exist",
            dir,
        ));
        return Ok(None);
    }

    let mut entries = fs::read_dir(dir)
        .and_then(|iter| {
            iter.map(|entry| entry.map(|entry| entry.path()))
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(|source| IngestError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
    entries.sort();

    let mut matching = Vec::new();
    for path in entries {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.is_dir() {
            report.add(LayoutIssue::error(
                IssueCode::UnexpectedFile,
                "buckets must be flat, found a subdirectory",
                &path,
            ));
        } else if classify_file_name(&name) == expected {
            matching.push(path);
        } else {
            report.add(LayoutIssue::error(
                IssueCode::UnexpectedFile,
                format!("'{name}' does not belong in this bucket"),
                &path,
            ));
        }
    }

    if matching.is_empty() {
        report.add(LayoutIssue::error(
            IssueCode::EmptyBucket,
            match expected {
                FileKind::Image => "no images found",
                _ => "no labels found",
            },
            dir,
        ));
    }

    Ok(Some(matching))
}

fn check_pairing(images: &[PathBuf], labels: &[PathBuf], report: &mut LayoutReport) {
    let image_stems: BTreeSet<String> = images.iter().map(|path| stem(path)).collect();
    let label_stems: BTreeSet<String> = labels.iter().map(|path| stem(path)).collect();

    for image in images {
        let image_stem = stem(image);
        if !label_stems.contains(&image_stem) {
            report.add(LayoutIssue::warning(
                IssueCode::ImageWithoutLabel,
                format!("no label for image '{image_stem}'"),
                image,
            ));
        }
    }

    for label in labels {
        let label_stem = stem(label);
        if !image_stems.contains(&label_stem) {
            report.add(LayoutIssue::warning(
                IssueCode::LabelWithoutImage,
                format!("no image for label '{label_stem}'"),
                label,
            ));
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, "x").expect("write file");
    }

    #[test]
    fn clean_layout_passes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let raw = temp.path();
        write(&raw.join("Images/a.jpg"));
        write(&raw.join("Images/b.PNG"));
        write(&raw.join("Labels/a.txt"));
        write(&raw.join("Labels/b.txt"));

        let report = verify_raw_dir(raw, &VerifyOptions::default()).expect("verify");
        assert_eq!(report.images, 2);
        assert_eq!(report.labels, 2);
        assert!(report.is_ok_strict(), "{report}");
    }

    #[test]
    fn missing_bucket_is_an_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        write(&temp.path().join("Images/a.jpg"));

        let report = verify_raw_dir(temp.path(), &VerifyOptions::default()).expect("verify");
        assert_eq!(report.issues_with(IssueCode::MissingDirectory).count(), 1);
        assert_eq!(report.issues_with(IssueCode::ImageWithoutLabel).count(), 0);
        assert!(!report.is_ok());
    }

    #[test]
    fn stray_and_unpaired_files_are_reported() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let raw = temp.path();
        write(&raw.join("Images/a.jpg"));
        write(&raw.join("Images/notes.txt"));
        write(&raw.join("Images/nested/c.jpg"));
        write(&raw.join("Labels/b.txt"));

        let report = verify_raw_dir(raw, &VerifyOptions::default()).expect("verify");

        assert_eq!(report.issues_with(IssueCode::UnexpectedFile).count(), 2);
        let unpaired_image: Vec<_> = report.issues_with(IssueCode::ImageWithoutLabel).collect();
        assert_eq!(unpaired_image.len(), 1);
        assert!(unpaired_image[0].path.ends_with("Images/a.jpg"));
        assert_eq!(report.issues_with(IssueCode::LabelWithoutImage).count(), 1);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn strict_mode_fails_on_warnings() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let raw = temp.path();
        write(&raw.join("Images/a.jpg"));
        write(&raw.join("Images/b.jpg"));
        write(&raw.join("Labels/a.txt"));

        let lenient = verify_raw_dir(raw, &VerifyOptions::default()).expect("verify");
        assert_eq!(lenient.warning_count(), 1);
        assert!(lenient.passed());

        let strict = verify_raw_dir(raw, &VerifyOptions { strict: true }).expect("verify");
        assert!(strict.strict);
        assert_eq!(strict.warning_count(), 1);
        assert!(!strict.passed());
    }

    #[test]
    fn empty_bucket_is_an_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(temp.path().join("Images")).expect("create images");
        write(&temp.path().join("Labels/a.txt"));

        let report = verify_raw_dir(temp.path(), &VerifyOptions::default()).expect("verify");
        let empty: Vec<_> = report.issues_with(IssueCode::EmptyBucket).collect();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].message, "no images found");
    }
}

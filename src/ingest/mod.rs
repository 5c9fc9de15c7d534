//! The ingestion pipeline: create `raw/`, download, unzip, classify.
//!
//! ```text
//! <target>/raw/Images/*.{jpg,jpeg,png}
//! <target>/raw/Labels/*.txt
//! ```
//!
//! Every stage boundary wraps failures with an [`IngestStage`] so the caller
//! sees which step broke along with the underlying cause. Nothing is retried and
//! partially populated buckets are left as they are.

pub mod archive;
pub mod collect;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{IngestError, IngestStage, StageExt};
use crate::hub::DatasetHub;

pub use archive::ArchiveOutcome;
pub use collect::{CollectSummary, CollisionPolicy};

/// Name of the normalized output directory under the target root.
pub const RAW_DIR_NAME: &str = "raw";
/// Flat image bucket under the raw directory.
pub const IMAGES_DIR_NAME: &str = "Images";
/// Flat label bucket under the raw directory.
pub const LABELS_DIR_NAME: &str = "Labels";

/// Downloads a dataset and normalizes it into `raw/Images` + `raw/Labels`.
pub struct DataIngestion<H> {
    dataset: String,
    target_dir: PathBuf,
    hub: H,
    collisions: CollisionPolicy,
}

/// Outcome of a successful ingestion run.
#[derive(Clone, Debug, Serialize)]
pub struct IngestReport {
    pub dataset: String,
    pub raw_dir: PathBuf,
    pub images_dir: PathBuf,
    pub labels_dir: PathBuf,
    /// Directory that was walked (the extraction dir for zip downloads).
    pub source_dir: PathBuf,
    pub archive: ArchiveOutcome,
    pub images: usize,
    pub labels: usize,
    pub skipped: usize,
    pub overwritten: usize,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Ingested '{}' into {}",
            self.dataset,
            self.raw_dir.display()
        )?;
        writeln!(f, "  source: {}", self.source_dir.display())?;
        writeln!(f, "  images: {}", self.images)?;
        writeln!(f, "  labels: {}", self.labels)?;
        writeln!(f, "  skipped: {}", self.skipped)?;
        if self.overwritten > 0 {
            writeln!(
                f,
                "  overwritten: {} (file name collisions, last copy kept)",
                self.overwritten
            )?;
        }
        Ok(())
    }
}

impl<H: DatasetHub> DataIngestion<H> {
    pub fn new(dataset: impl Into<String>, target_dir: impl Into<PathBuf>, hub: H) -> Self {
        Self {
            dataset: dataset.into(),
            target_dir: target_dir.into(),
            hub,
            collisions: CollisionPolicy::default(),
        }
    }

    /// Choose how file name collisions between subdirectories are handled.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Ensure `<target>/raw` exists and return it.
    pub fn create_raw_dir(&self) -> Result<PathBuf, IngestError> {
        let raw_dir = self.target_dir.join(RAW_DIR_NAME);
        fs::create_dir_all(&raw_dir).map_err(|source| IngestError::CreateDir {
            path: raw_dir.clone(),
            source,
        })?;
        Ok(raw_dir)
    }

    /// Fetch the dataset from the hub and hand it to extraction.
    pub fn download_dataset(&self, raw_dir: &Path) -> Result<IngestReport, IngestError> {
        let dataset_path = self
            .hub
            .download(&self.dataset)
            .in_stage(IngestStage::Download)?;
        info!("Dataset downloaded at: {}", dataset_path.display());

        self.extract_images_and_labels(&dataset_path, raw_dir)
            .in_stage(IngestStage::Download)
    }

    /// Unzip the download if needed, then classify its files.
    pub fn extract_images_and_labels(
        &self,
        dataset_path: &Path,
        raw_dir: &Path,
    ) -> Result<IngestReport, IngestError> {
        self.extract_inner(dataset_path, raw_dir)
            .in_stage(IngestStage::Extract)
    }

    fn extract_inner(
        &self,
        dataset_path: &Path,
        raw_dir: &Path,
    ) -> Result<IngestReport, IngestError> {
        info!("Dataset cache path: {}", dataset_path.display());

        let (source_dir, archive) = if archive::is_zip_archive(dataset_path) {
            archive::extract_once(dataset_path)?
        } else {
            (dataset_path.to_path_buf(), ArchiveOutcome::NotArchive)
        };

        let summary = self.extract_yolo_recursive(&source_dir, raw_dir)?;

        Ok(IngestReport {
            dataset: self.dataset.clone(),
            raw_dir: raw_dir.to_path_buf(),
            images_dir: raw_dir.join(IMAGES_DIR_NAME),
            labels_dir: raw_dir.join(LABELS_DIR_NAME),
            source_dir,
            archive,
            images: summary.images,
            labels: summary.labels,
            skipped: summary.skipped,
            overwritten: summary.overwritten,
        })
    }

    /// Reset both buckets and refill them from every file under
    /// `dataset_path`.
    ///
    /// Fails with [`IngestError::MissingData`] when the walk turns up no
    /// images or no labels.
    pub fn extract_yolo_recursive(
        &self,
        dataset_path: &Path,
        raw_dir: &Path,
    ) -> Result<CollectSummary, IngestError> {
        let images_dst = raw_dir.join(IMAGES_DIR_NAME);
        let labels_dst = raw_dir.join(LABELS_DIR_NAME);

        for dir in [&images_dst, &labels_dst] {
            collect::reset_dir(dir)?;
        }

        let summary =
            collect::collect_yolo_files(dataset_path, &images_dst, &labels_dst, self.collisions)?;

        info!(
            "Collected {} images and {} labels",
            summary.images, summary.labels
        );

        if summary.images == 0 || summary.labels == 0 {
            return Err(IngestError::MissingData {
                root: dataset_path.to_path_buf(),
                images: summary.images,
                labels: summary.labels,
            });
        }

        Ok(summary)
    }

    /// Run the full pipeline: create `raw/`, download, extract, classify.
    pub fn run(&self) -> Result<IngestReport, IngestError> {
        self.run_stages().in_stage(IngestStage::Pipeline)
    }

    fn run_stages(&self) -> Result<IngestReport, IngestError> {
        let raw_dir = self.create_raw_dir()?;
        let report = self.download_dataset(&raw_dir)?;
        info!("Data ingestion completed successfully");
        Ok(report)
    }
}

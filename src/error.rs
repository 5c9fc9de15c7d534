use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::verify::LayoutReport;

/// Pipeline stage a failure is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestStage {
    /// The whole `create dir -> download -> extract` sequence.
    Pipeline,
    /// Fetching the dataset from its hub (includes everything downstream).
    Download,
    /// Unpacking the archive and classifying files into Images/Labels.
    Extract,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            IngestStage::Pipeline => "Data ingestion pipeline failed",
            IngestStage::Download => "Error while downloading dataset",
            IngestStage::Extract => "Error while extracting images and labels",
        };
        f.write_str(message)
    }
}

/// The main error type for yolo-ingest operations.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reset directory {path}")]
    ResetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {path}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed while traversing {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read zip archive {path}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(
        "No images or labels found while walking dataset structure at {root} \
         ({images} image(s), {labels} label(s))"
    )]
    MissingData {
        root: PathBuf,
        images: usize,
        labels: usize,
    },

    #[error("File name collision for '{name}': {second} would overwrite {first}")]
    Collision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to resolve dataset reference '{input}': {message}")]
    HubResolve { input: String, message: String },

    #[error("Dataset hub request failed for '{dataset}': {message}")]
    HubApi { dataset: String, message: String },

    #[error("Failed to download '{file}' for dataset '{dataset}': {message}")]
    HubDownload {
        dataset: String,
        file: String,
        message: String,
    },

    #[error("Missing {hub} credentials: {message}")]
    HubCredentials { hub: &'static str, message: String },

    #[error("{hub} support is not compiled in (enable the '{feature}' feature)")]
    HubUnavailable {
        hub: &'static str,
        feature: &'static str,
    },

    #[error("Dataset path does not exist: {0}")]
    DatasetNotFound(PathBuf),

    #[error("Failed to read config file {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Failed to serialize report")]
    ReportSerialize(#[source] serde_json::Error),

    #[error("Layout verification failed with {error_count} error(s) and {warning_count} warning(s)")]
    VerifyFailed {
        error_count: usize,
        warning_count: usize,
        report: LayoutReport,
    },

    #[error("{stage}")]
    Stage {
        stage: IngestStage,
        #[source]
        source: Box<IngestError>,
    },
}

impl IngestError {
    /// Wrap this error with the context of a pipeline stage.
    pub fn in_stage(self, stage: IngestStage) -> Self {
        IngestError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every stage wrapper.
    pub fn root_cause(&self) -> &IngestError {
        let mut current = self;
        while let IngestError::Stage { source, .. } = current {
            current = source;
        }
        current
    }

    /// Stages this error passed through, outermost first.
    pub fn stages(&self) -> Vec<IngestStage> {
        let mut stages = Vec::new();
        let mut current = self;
        while let IngestError::Stage { stage, source } = current {
            stages.push(*stage);
            current = source;
        }
        stages
    }
}

/// Attach a stage to the error side of a `Result`.
pub(crate) trait StageExt<T> {
    fn in_stage(self, stage: IngestStage) -> Result<T, IngestError>;
}

impl<T> StageExt<T> for Result<T, IngestError> {
    fn in_stage(self, stage: IngestStage) -> Result<T, IngestError> {
        self.map_err(|err| err.in_stage(stage))
    }
}

//! Layout report types for verified raw directories.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The result of verifying a raw directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LayoutReport {
    /// Directory that was inspected.
    pub raw_dir: PathBuf,
    /// Image files found in `Images/`.
    pub images: usize,
    /// Label files found in `Labels/`.
    pub labels: usize,
    /// Whether warnings count as failures.
    pub strict: bool,
    /// All issues found during verification.
    pub issues: Vec<LayoutIssue>,
}

impl LayoutReport {
    /// Creates a new empty report for `raw_dir`.
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            ..Default::default()
        }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: LayoutIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if verification passed in strict mode (no errors or warnings).
    pub fn is_ok_strict(&self) -> bool {
        self.issues.is_empty()
    }

    /// Pass/fail under the report's own strictness.
    pub fn passed(&self) -> bool {
        if self.strict {
            self.is_ok_strict()
        } else {
            self.is_ok()
        }
    }

    /// Issues with the given code, in discovery order.
    pub fn issues_with(&self, code: IssueCode) -> impl Iterator<Item = &LayoutIssue> {
        self.issues.iter().filter(move |issue| issue.code == code)
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} image(s), {} label(s)",
            self.raw_dir.display(),
            self.images,
            self.labels
        )?;

        if self.issues.is_empty() {
            return writeln!(f, "Verification passed: no issues found");
        }

        writeln!(
            f,
            "Verification completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single verification issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct LayoutIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    /// File or directory the issue is about.
    pub path: PathBuf,
}

impl LayoutIssue {
    pub fn error(code: IssueCode, message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} at {}: {}",
            severity,
            self.code,
            self.path.display(),
            self.message
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Training can proceed but some samples are incomplete.
    Warning,
    /// The directory does not have the expected shape.
    Error,
}

/// A stable code identifying the type of layout issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    /// `Images/` or `Labels/` does not exist.
    MissingDirectory,
    /// A bucket holds no files of its kind.
    EmptyBucket,
    /// A bucket holds a file with the wrong extension (or a subdirectory).
    UnexpectedFile,
    /// An image has no label with the same stem.
    ImageWithoutLabel,
    /// A label has no image with the same stem.
    LabelWithoutImage,
}

//! Job and batch data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::options::OcrOptions;

/// One file's OCR invocation within a batch run
///
/// Created when the batch starts, immutable during execution. The options are
/// snapshotted so later UI edits cannot affect an in-flight run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Input PDF path
    pub input: PathBuf,

    /// Resolved output PDF path
    pub output: PathBuf,

    /// Options snapshot for this job
    pub options: OcrOptions,
}

impl Job {
    pub fn new(input: PathBuf, output: PathBuf, options: OcrOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    /// Short display name (input file name)
    pub fn name(&self) -> String {
        self.input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Job status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Tool ran and produced a searchable PDF
    Ocred,
    /// Tool found an existing text layer; nothing to do
    PriorOcr,
    /// Tool ran but reported failure (non-zero exit)
    ToolFailed,
    /// Host could not start the tool at all
    ExecFailed,
    /// Output path existed under the fail-fast collision policy
    Collision,
}

impl JobStatus {
    /// Whether this status counts as success for reporting
    ///
    /// An existing text layer is a special kind of success: the file already
    /// is what the user wanted it to become.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Ocred | JobStatus::PriorOcr)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Ocred => write!(f, "OCR complete"),
            JobStatus::PriorOcr => write!(f, "Already has text layer"),
            JobStatus::ToolFailed => write!(f, "OCR failed"),
            JobStatus::ExecFailed => write!(f, "Could not run tool"),
            JobStatus::Collision => write!(f, "Output already exists"),
        }
    }
}

/// Result of one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// The job this result belongs to
    pub job: Job,

    /// Status classification
    pub status: JobStatus,

    /// Tool exit code, if a process ran to completion
    pub exit_code: Option<i32>,

    /// Captured diagnostic text (stderr tail for failures)
    pub diagnostics: String,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Progress snapshot passed to the batch progress callback
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Jobs finished so far (including the one just reported)
    pub completed: usize,

    /// Total jobs in the batch
    pub total: usize,

    /// Successes so far
    pub succeeded: usize,

    /// Failures so far
    pub failed: usize,

    /// File the last result belongs to
    pub current: String,
}

/// Aggregated outcome of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-job results in input-list order
    pub results: Vec<JobResult>,

    /// Whether the batch stopped early on a cancel request
    pub cancelled: bool,

    /// When the batch finished (or was cancelled)
    pub finished_at: chrono::DateTime<chrono::Local>,
}

impl BatchReport {
    pub fn new(results: Vec<JobResult>, cancelled: bool) -> Self {
        Self {
            results,
            cancelled,
            finished_at: chrono::Local::now(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// One-line summary for the status bar / log
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} succeeded, {} failed",
            self.succeeded(),
            self.failed()
        );
        if self.cancelled {
            line.push_str(" (cancelled)");
        }
        line
    }
}

//! OCR engine wrapper
//!
//! Wraps the external OCRmyPDF command-line tool: probes tool availability
//! and installed Tesseract language packs at construction, translates options
//! into invocations, runs them, and classifies the outcome. The wrapper never
//! treats a tool-reported failure as a host failure.

pub mod command;

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::core::fs;
use crate::core::io::runner::{CommandRunner, LogCallback};
use crate::core::models::jobs::{Job, JobResult, JobStatus};
use crate::core::models::options::OcrOptions;
use crate::core::models::results::{CoreError, CoreResult};

/// OCRmyPDF exit code for "page already has text" (ExitCode.already_done_ocr)
const EXIT_PRIOR_OCR: i32 = 6;

/// Diagnostic marker for an existing text layer, for older tool versions that
/// report it only in the error text
const PRIOR_OCR_MARKER: &str = "page already has text";

/// How many trailing stderr lines to keep as job diagnostics
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// Display names for common Tesseract language codes
static LANGUAGE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("eng", "English"),
        ("chi_sim", "Chinese (Simplified)"),
        ("chi_tra", "Chinese (Traditional)"),
        ("jpn", "Japanese"),
        ("kor", "Korean"),
        ("fra", "French"),
        ("deu", "German"),
        ("rus", "Russian"),
        ("spa", "Spanish"),
        ("ita", "Italian"),
        ("por", "Portuguese"),
        ("nld", "Dutch"),
        ("ara", "Arabic"),
        ("hin", "Hindi"),
        ("vie", "Vietnamese"),
        ("tha", "Thai"),
        ("tur", "Turkish"),
        ("heb", "Hebrew"),
        ("swe", "Swedish"),
        ("fin", "Finnish"),
        ("dan", "Danish"),
        ("nor", "Norwegian"),
        ("pol", "Polish"),
        ("ukr", "Ukrainian"),
        ("ces", "Czech"),
        ("hun", "Hungarian"),
        ("ell", "Greek"),
        ("ind", "Indonesian"),
    ])
});

/// User-facing name for a Tesseract language code
pub fn language_name(code: &str) -> String {
    match LANGUAGE_NAMES.get(code) {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    }
}

/// OCR engine wrapper around the external ocrmypdf executable
pub struct OcrEngine {
    ocrmypdf_path: String,
    version: Option<String>,
    available_languages: Vec<String>,
    log: Option<LogCallback>,
}

impl OcrEngine {
    /// Probe the tools on `PATH`
    pub fn detect() -> Self {
        Self::with_tools(command::OCRMYPDF, "tesseract")
    }

    /// Probe explicitly named tool executables
    ///
    /// Runs `<ocrmypdf> --version` and `<tesseract> --list-langs` once. When
    /// either probe fails the engine still constructs, reporting itself as
    /// unavailable or with an unknown language set.
    pub fn with_tools(ocrmypdf: impl Into<String>, tesseract: impl Into<String>) -> Self {
        let ocrmypdf_path = ocrmypdf.into();
        let tesseract_path = tesseract.into();
        let runner = CommandRunner::new();

        let version = match runner.run(&[ocrmypdf_path.clone(), "--version".to_string()]) {
            Ok(out) if out.success => {
                let v = out.stdout.trim().to_string();
                tracing::info!(version = %v, "ocrmypdf available");
                Some(v)
            }
            Ok(_) => {
                tracing::warn!("ocrmypdf --version returned an error");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "ocrmypdf not found");
                None
            }
        };

        let available_languages = Self::probe_languages(&runner, &tesseract_path);
        if !available_languages.is_empty() {
            tracing::info!(
                languages = %available_languages.join(", "),
                "installed Tesseract language packs"
            );
        }

        Self {
            ocrmypdf_path,
            version,
            available_languages,
            log: None,
        }
    }

    /// Attach a log callback passed through to the command runner
    pub fn with_log_callback(mut self, log: LogCallback) -> Self {
        self.log = Some(log);
        self
    }

    /// `tesseract --list-langs` output, skipping the header line
    fn probe_languages(runner: &CommandRunner, tesseract_path: &str) -> Vec<String> {
        match runner.run(&[tesseract_path.to_string(), "--list-langs".to_string()]) {
            Ok(out) if out.success => out
                .stdout
                .lines()
                .skip(1)
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            Ok(_) | Err(_) => {
                tracing::warn!("could not list Tesseract languages");
                Vec::new()
            }
        }
    }

    /// Whether the ocrmypdf probe succeeded
    pub fn is_available(&self) -> bool {
        self.version.is_some()
    }

    /// Probed tool version string
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Installed Tesseract language codes (empty when probing failed)
    pub fn available_languages(&self) -> &[String] {
        &self.available_languages
    }

    /// Validate options against this engine's probed state
    ///
    /// On top of the structural checks, rejects language codes not present in
    /// the probed set. The membership check is skipped when the language list
    /// could not be probed, since nothing is known then.
    pub fn validate_options(&self, options: &OcrOptions) -> CoreResult<()> {
        options.validate()?;

        if !self.available_languages.is_empty() {
            for code in &options.languages {
                if !self.available_languages.contains(code) {
                    return Err(CoreError::Validation(format!(
                        "language '{}' is not installed (available: {})",
                        code,
                        self.available_languages.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }

    /// Run one OCR job to completion
    ///
    /// Validation failures return `Err` before any process is spawned. Every
    /// other outcome, including a missing input file and a tool that cannot
    /// be started, is classified into the returned `JobResult` so a batch can
    /// carry on with the next file.
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        options: &OcrOptions,
    ) -> CoreResult<JobResult> {
        self.validate_options(options)?;

        let job = Job::new(input.to_path_buf(), output.to_path_buf(), options.clone());

        if !fs::is_valid_pdf(input) {
            tracing::error!(input = %input.display(), "input is not a readable PDF");
            return Ok(JobResult {
                job,
                status: JobStatus::ExecFailed,
                exit_code: None,
                diagnostics: format!("input is not a readable PDF: {}", input.display()),
            });
        }

        let mut cmd = command::build_invocation(input, output, options)?;
        cmd[0] = self.ocrmypdf_path.clone();

        let mut runner = CommandRunner::new();
        if let Some(log) = &self.log {
            runner = runner.with_log_callback(log.clone());
        }

        let result = match runner.run(&cmd) {
            Ok(out) => {
                let status = Self::classify(out.exit_code, &out.stderr);
                JobResult {
                    job,
                    status,
                    exit_code: out.exit_code,
                    diagnostics: tail_lines(&out.stderr, DIAGNOSTIC_TAIL_LINES),
                }
            }
            Err(e) => JobResult {
                job,
                status: JobStatus::ExecFailed,
                exit_code: None,
                diagnostics: e.to_string(),
            },
        };

        match result.status {
            JobStatus::Ocred => {
                tracing::info!(output = %output.display(), "OCR complete")
            }
            JobStatus::PriorOcr => {
                tracing::info!(input = %input.display(), "file already has a text layer")
            }
            _ => tracing::error!(
                input = %input.display(),
                status = %result.status,
                "OCR job failed"
            ),
        }

        Ok(result)
    }

    /// Map a finished process to a job status
    fn classify(exit_code: Option<i32>, stderr: &str) -> JobStatus {
        match exit_code {
            Some(0) => JobStatus::Ocred,
            Some(EXIT_PRIOR_OCR) => JobStatus::PriorOcr,
            _ if stderr.contains(PRIOR_OCR_MARKER) => JobStatus::PriorOcr,
            _ => JobStatus::ToolFailed,
        }
    }
}

/// Last `n` lines of a diagnostic stream
fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

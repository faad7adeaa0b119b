//! Batch orchestration
//!
//! Drives one OCR engine invocation per input file, in list order, on a
//! dedicated worker thread. Progress flows back through a callback; the UI
//! thread never does OCR work itself. Cancellation is cooperative and checked
//! only between files, so an in-flight invocation always runs to completion.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::core::engine::OcrEngine;
use crate::core::fs;
use crate::core::models::jobs::{BatchProgress, BatchReport, Job, JobResult, JobStatus};
use crate::core::models::options::{CollisionPolicy, OcrOptions, OutputNaming};
use crate::core::models::results::{CoreError, CoreResult};

/// Progress callback invoked after every finished job
pub type ProgressCallback = Arc<dyn Fn(&BatchProgress) + Send + Sync>;

/// Shared cancellation flag
///
/// Cloned into the worker; checked at file-loop boundaries only.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the batch stops before starting the next job
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolve the output path for one input under a naming strategy
///
/// Refuses to resolve onto the input path itself, except under `Replace`,
/// which is the one strategy that explicitly permits in-place output.
pub fn resolve_output_path(
    input: &Path,
    output_dir: &Path,
    naming: &OutputNaming,
) -> CoreResult<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            CoreError::Validation(format!("input has no file name: {}", input.display()))
        })?;
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("pdf");

    let file_name = match naming {
        OutputNaming::Suffix(suffix) => format!("{}{}.{}", stem, suffix, ext),
        OutputNaming::Prefix(prefix) => format!("{}{}.{}", prefix, stem, ext),
        OutputNaming::Replace => format!("{}.{}", stem, ext),
        OutputNaming::Template(template) => {
            template.replace("{stem}", stem).replace("{ext}", ext)
        }
    };

    let candidate = output_dir.join(file_name);

    if same_path(&candidate, input) && !matches!(naming, OutputNaming::Replace) {
        return Err(CoreError::Validation(format!(
            "naming strategy would overwrite the input file: {}",
            input.display()
        )));
    }

    Ok(candidate)
}

/// Path equality by components, so `.` segments and doubled separators do
/// not defeat the overwrite guard
fn same_path(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

/// Append `_1`, `_2`, ... before the extension until the path is free
fn disambiguate(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("pdf");
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    for n in 1.. {
        let candidate = dir.join(format!("{}_{}.{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

/// Batch orchestrator
pub struct BatchRunner {
    engine: Arc<OcrEngine>,
}

impl BatchRunner {
    pub fn new(engine: Arc<OcrEngine>) -> Self {
        Self { engine }
    }

    /// Run a batch to completion (or cancellation) on the calling thread
    ///
    /// Options are validated once up front; a validation failure aborts
    /// before any job starts. Per-job failures (tool error, host error,
    /// collision under the fail-fast policy) are recorded in the report and
    /// never abort the batch. Results come back in input-list order.
    pub fn run(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        options: &OcrOptions,
        on_progress: Option<ProgressCallback>,
        cancel: &CancelToken,
    ) -> CoreResult<BatchReport> {
        self.engine.validate_options(options)?;
        fs::ensure_dir(output_dir)?;

        let total = files.len();
        let mut results: Vec<JobResult> = Vec::with_capacity(total);
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut cancelled = false;

        tracing::info!(total, output_dir = %output_dir.display(), "starting batch");

        for input in files {
            if cancel.is_cancelled() {
                tracing::info!(
                    completed = results.len(),
                    total,
                    "cancel requested, stopping batch"
                );
                cancelled = true;
                break;
            }

            let result = match self.prepare_output(input, output_dir, options) {
                Ok(output) => self.engine.process_file(input, &output, options)?,
                Err(CoreError::Collision(existing)) => JobResult {
                    job: Job::new(input.clone(), existing.clone(), options.clone()),
                    status: JobStatus::Collision,
                    exit_code: None,
                    diagnostics: format!(
                        "output path already exists: {}",
                        existing.display()
                    ),
                },
                // A path that cannot be resolved fails that job, not the batch
                Err(e) => JobResult {
                    job: Job::new(input.clone(), PathBuf::new(), options.clone()),
                    status: JobStatus::ExecFailed,
                    exit_code: None,
                    diagnostics: e.to_string(),
                },
            };

            if result.is_success() {
                succeeded += 1;
            } else {
                failed += 1;
            }
            results.push(result);

            if let Some(cb) = &on_progress {
                cb(&BatchProgress {
                    completed: results.len(),
                    total,
                    succeeded,
                    failed,
                    current: input
                        .file_name()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                });
            }
        }

        let report = BatchReport::new(results, cancelled);
        tracing::info!(summary = %report.summary(), "batch finished");
        Ok(report)
    }

    /// Resolve and collision-check the output path for one input
    fn prepare_output(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &OcrOptions,
    ) -> CoreResult<PathBuf> {
        let path = resolve_output_path(input, output_dir, &options.naming)?;

        // In-place Replace overwrites the input by explicit choice
        if same_path(&path, input) && matches!(options.naming, OutputNaming::Replace) {
            return Ok(path);
        }

        if path.exists() {
            return match options.on_collision {
                CollisionPolicy::Rename => {
                    let renamed = disambiguate(&path);
                    tracing::warn!(
                        from = %path.display(),
                        to = %renamed.display(),
                        "output exists, renaming"
                    );
                    Ok(renamed)
                }
                CollisionPolicy::Fail => Err(CoreError::Collision(path)),
            };
        }

        Ok(path)
    }
}

/// Handle to a batch running on a worker thread
pub struct BatchHandle {
    cancel: CancelToken,
    worker: JoinHandle<CoreResult<BatchReport>>,
}

impl BatchHandle {
    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token clone for wiring into UI controls
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker and return its report
    pub fn join(self) -> CoreResult<BatchReport> {
        self.worker
            .join()
            .map_err(|_| CoreError::Execution("batch worker thread panicked".to_string()))?
    }
}

/// Run a batch on a dedicated worker thread
///
/// This is the handoff point between the UI thread and OCR work: the caller
/// keeps the handle (cancel + join), the worker owns the inputs and pushes
/// progress through the callback.
pub fn spawn_batch(
    engine: Arc<OcrEngine>,
    files: Vec<PathBuf>,
    output_dir: PathBuf,
    options: OcrOptions,
    on_progress: Option<ProgressCallback>,
) -> BatchHandle {
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let worker = std::thread::spawn(move || {
        let runner = BatchRunner::new(engine);
        runner.run(&files, &output_dir, &options, on_progress, &token)
    });

    BatchHandle { cancel, worker }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::options::OptimizeLevel;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn stub_tool(dir: &TempDir, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh\n{}", body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn fake_pdf(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();
        path
    }

    #[cfg(unix)]
    fn ok_engine(dir: &TempDir) -> Arc<OcrEngine> {
        let tool = stub_tool(dir, "ocrmypdf-ok", "exit 0");
        Arc::new(OcrEngine::with_tools(tool, "/nonexistent/tesseract"))
    }

    #[test]
    fn test_resolve_suffix() {
        let out = resolve_output_path(
            Path::new("/in/a.pdf"),
            Path::new("/out"),
            &OutputNaming::Suffix("_ocr".to_string()),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/a_ocr.pdf"));
    }

    #[test]
    fn test_resolve_prefix() {
        let out = resolve_output_path(
            Path::new("/in/a.pdf"),
            Path::new("/out"),
            &OutputNaming::Prefix("OCR_".to_string()),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/OCR_a.pdf"));
    }

    #[test]
    fn test_resolve_replace_keeps_name() {
        let out = resolve_output_path(
            Path::new("/in/a.pdf"),
            Path::new("/out"),
            &OutputNaming::Replace,
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/a.pdf"));
    }

    #[test]
    fn test_resolve_template() {
        let out = resolve_output_path(
            Path::new("/in/scan.pdf"),
            Path::new("/out"),
            &OutputNaming::Template("{stem}_searchable.{ext}".to_string()),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/scan_searchable.pdf"));
    }

    #[test]
    fn test_resolve_refuses_overwriting_input() {
        // Empty suffix into the input's own directory lands on the input
        let err = resolve_output_path(
            Path::new("/in/a.pdf"),
            Path::new("/in"),
            &OutputNaming::Suffix(String::new()),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // Replace explicitly permits exactly that
        let out = resolve_output_path(
            Path::new("/in/a.pdf"),
            Path::new("/in"),
            &OutputNaming::Replace,
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/in/a.pdf"));
    }

    #[test]
    fn test_overwrite_guard_sees_through_dot_segments() {
        // `/in/./a.pdf` and `/in/a.pdf` are the same file
        let err = resolve_output_path(
            Path::new("/in/./a.pdf"),
            Path::new("/in"),
            &OutputNaming::Suffix(String::new()),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = resolve_output_path(
            Path::new("/in//a.pdf"),
            Path::new("/in"),
            &OutputNaming::Suffix(String::new()),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let out_dir = dir.path().join("out");

        let files = vec![
            fake_pdf(dir.path(), "c.pdf"),
            fake_pdf(dir.path(), "a.pdf"),
            fake_pdf(dir.path(), "b.pdf"),
        ];

        let report = BatchRunner::new(engine)
            .run(
                &files,
                &out_dir,
                &OcrOptions::default(),
                None,
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert!(!report.cancelled);
        for (result, input) in report.results.iter().zip(&files) {
            assert_eq!(&result.job.input, input);
            assert_eq!(result.status, JobStatus::Ocred);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_scenario_suffix_and_optimize() {
        // a.pdf, b.pdf with suffix "_ocr" and optimize level 1 must resolve
        // to a_ocr.pdf / b_ocr.pdf and carry -O 1 in both invocations.
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let out_dir = dir.path().join("out");

        let files = vec![fake_pdf(dir.path(), "a.pdf"), fake_pdf(dir.path(), "b.pdf")];
        let mut options = OcrOptions::default();
        options.optimize = OptimizeLevel::Safe;
        options.naming = OutputNaming::Suffix("_ocr".to_string());

        let report = BatchRunner::new(engine)
            .run(&files, &out_dir, &options, None, &CancelToken::new())
            .unwrap();

        assert_eq!(report.results[0].job.output, out_dir.join("a_ocr.pdf"));
        assert_eq!(report.results[1].job.output, out_dir.join("b_ocr.pdf"));
        for result in &report.results {
            let cmd = crate::core::engine::command::build_invocation(
                &result.job.input,
                &result.job.output,
                &result.job.options,
            )
            .unwrap();
            let pos = cmd.iter().position(|t| t == "-O").unwrap();
            assert_eq!(cmd[pos + 1], "1");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_continues_past_failures() {
        let dir = TempDir::new().unwrap();
        let tool = stub_tool(
            &dir,
            "ocrmypdf-flaky",
            "echo \"$@\" | grep -q bad && exit 1; exit 0",
        );
        let engine = Arc::new(OcrEngine::with_tools(tool, "/nonexistent/tesseract"));
        let out_dir = dir.path().join("out");

        let files = vec![
            fake_pdf(dir.path(), "good.pdf"),
            fake_pdf(dir.path(), "bad.pdf"),
            fake_pdf(dir.path(), "fine.pdf"),
        ];

        let report = BatchRunner::new(engine)
            .run(
                &files,
                &out_dir,
                &OcrOptions::default(),
                None,
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.results[1].status, JobStatus::ToolFailed);
        assert_eq!(report.summary(), "2 succeeded, 1 failed");
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_records_unresolvable_input_and_continues() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let out_dir = dir.path().join("out");

        // The root directory has no file name, so its output path cannot be
        // resolved; neighbours must still be processed.
        let files = vec![
            fake_pdf(dir.path(), "a.pdf"),
            PathBuf::from("/"),
            fake_pdf(dir.path(), "b.pdf"),
        ];

        let report = BatchRunner::new(engine)
            .run(
                &files,
                &out_dir,
                &OcrOptions::default(),
                None,
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].status, JobStatus::Ocred);
        assert_eq!(report.results[1].status, JobStatus::ExecFailed);
        assert!(report.results[1].diagnostics.contains("no file name"));
        assert_eq!(report.results[2].status, JobStatus::Ocred);
        assert_eq!(report.summary(), "2 succeeded, 1 failed");
    }

    #[cfg(unix)]
    #[test]
    fn test_batch_progress_counts() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let out_dir = dir.path().join("out");
        let files = vec![fake_pdf(dir.path(), "a.pdf"), fake_pdf(dir.path(), "b.pdf")];

        let snapshots: Arc<Mutex<Vec<(usize, usize, String)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = snapshots.clone();
        let on_progress: ProgressCallback = Arc::new(move |p: &BatchProgress| {
            sink.lock()
                .unwrap()
                .push((p.completed, p.total, p.current.clone()));
        });

        BatchRunner::new(engine)
            .run(
                &files,
                &out_dir,
                &OcrOptions::default(),
                Some(on_progress),
                &CancelToken::new(),
            )
            .unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(
            *snapshots,
            vec![
                (1, 2, "a.pdf".to_string()),
                (2, 2, "b.pdf".to_string())
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_between_files() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let out_dir = dir.path().join("out");
        let files = vec![
            fake_pdf(dir.path(), "a.pdf"),
            fake_pdf(dir.path(), "b.pdf"),
            fake_pdf(dir.path(), "c.pdf"),
        ];

        let cancel = CancelToken::new();
        let token = cancel.clone();
        let on_progress: ProgressCallback = Arc::new(move |p: &BatchProgress| {
            if p.completed == 1 {
                token.cancel();
            }
        });

        let report = BatchRunner::new(engine)
            .run(
                &files,
                &out_dir,
                &OcrOptions::default(),
                Some(on_progress),
                &cancel,
            )
            .unwrap();

        // Signalled after the first file: nothing beyond it may start
        assert_eq!(report.results.len(), 1);
        assert!(report.cancelled);
        assert!(report.summary().ends_with("(cancelled)"));
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_before_start_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let cancel = CancelToken::new();
        cancel.cancel();

        let files = vec![fake_pdf(dir.path(), "a.pdf")];
        let report = BatchRunner::new(engine)
            .run(
                &files,
                &dir.path().join("out"),
                &OcrOptions::default(),
                None,
                &cancel,
            )
            .unwrap();
        assert!(report.results.is_empty());
        assert!(report.cancelled);
    }

    #[cfg(unix)]
    #[test]
    fn test_collision_fail_fast_spawns_nothing() {
        let dir = TempDir::new().unwrap();
        // Tool writes a marker file when it runs a job; the construction-time
        // version probe must not count
        let marker = dir.path().join("ran");
        let tool = stub_tool(
            &dir,
            "ocrmypdf-marker",
            &format!(
                "[ \"$1\" = \"--version\" ] && exit 0; touch {}; exit 0",
                marker.display()
            ),
        );
        let engine = Arc::new(OcrEngine::with_tools(tool, "/nonexistent/tesseract"));

        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        std::fs::write(out_dir.join("a_ocr.pdf"), b"existing").unwrap();

        let files = vec![fake_pdf(dir.path(), "a.pdf")];
        let mut options = OcrOptions::default();
        options.on_collision = CollisionPolicy::Fail;

        let report = BatchRunner::new(engine)
            .run(&files, &out_dir, &options, None, &CancelToken::new())
            .unwrap();

        assert_eq!(report.results[0].status, JobStatus::Collision);
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_collision_rename_picks_free_name() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);

        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        std::fs::write(out_dir.join("a_ocr.pdf"), b"existing").unwrap();
        std::fs::write(out_dir.join("a_ocr_1.pdf"), b"also existing").unwrap();

        let files = vec![fake_pdf(dir.path(), "a.pdf")];
        let report = BatchRunner::new(engine)
            .run(
                &files,
                &out_dir,
                &OcrOptions::default(),
                None,
                &CancelToken::new(),
            )
            .unwrap();

        assert_eq!(report.results[0].status, JobStatus::Ocred);
        assert_eq!(report.results[0].job.output, out_dir.join("a_ocr_2.pdf"));
    }

    #[test]
    fn test_invalid_options_abort_before_any_job() {
        let engine = Arc::new(OcrEngine::with_tools(
            "/nonexistent/ocrmypdf",
            "/nonexistent/tesseract",
        ));
        let mut options = OcrOptions::default();
        options.languages.clear();

        let err = BatchRunner::new(engine)
            .run(
                &[PathBuf::from("a.pdf")],
                Path::new("/tmp/ocr-out-never-used"),
                &options,
                None,
                &CancelToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_batch_reports_back() {
        let dir = TempDir::new().unwrap();
        let engine = ok_engine(&dir);
        let files = vec![fake_pdf(dir.path(), "a.pdf")];

        let handle = spawn_batch(
            engine,
            files,
            dir.path().join("out"),
            OcrOptions::default(),
            None,
        );
        let report = handle.join().unwrap();
        assert_eq!(report.results.len(), 1);
        assert!(report.results[0].is_success());
    }
}

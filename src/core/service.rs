//! GUI-facing service facade
//!
//! The one seam a front-end (or the bundled CLI) talks to: profiles, single
//! runs, and batch runs with progress and cancellation. The facade owns the
//! engine and stores; the caller owns the UI thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::batch::{self, BatchHandle, BatchRunner, CancelToken, ProgressCallback};
use crate::core::config::AppConfig;
use crate::core::engine::OcrEngine;
use crate::core::models::jobs::{BatchReport, JobResult};
use crate::core::models::options::OcrOptions;
use crate::core::models::results::CoreResult;
use crate::core::profiles::ProfileStore;

/// Front-end service composing config, profiles, engine, and batch runner
pub struct OcrService {
    config: AppConfig,
    profiles: ProfileStore,
    engine: Arc<OcrEngine>,
}

impl OcrService {
    /// Construct from the default config location, probing tools on `PATH`
    pub fn new() -> CoreResult<Self> {
        Ok(Self {
            config: AppConfig::load_or_default()?,
            profiles: ProfileStore::open_default()?,
            engine: Arc::new(OcrEngine::detect()),
        })
    }

    /// Construct with explicit parts (used by tests and embedders)
    pub fn with_parts(config: AppConfig, profiles: ProfileStore, engine: OcrEngine) -> Self {
        Self {
            config,
            profiles,
            engine: Arc::new(engine),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn engine(&self) -> &OcrEngine {
        &self.engine
    }

    // Profiles

    pub fn list_profiles(&self) -> Vec<String> {
        self.profiles.list()
    }

    pub fn save_profile(&mut self, name: &str, options: OcrOptions) -> CoreResult<()> {
        self.profiles.save(name, options)
    }

    pub fn load_profile(&self, name: &str) -> CoreResult<OcrOptions> {
        self.profiles.load(name)
    }

    pub fn delete_profile(&mut self, name: &str) -> CoreResult<()> {
        self.profiles.delete(name)
    }

    // Runs

    /// OCR a single file to an explicit output path
    pub fn run_single(
        &self,
        input: &Path,
        output: &Path,
        options: &OcrOptions,
    ) -> CoreResult<JobResult> {
        self.engine.process_file(input, output, options)
    }

    /// Run a batch on the calling thread
    pub fn run_batch(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        options: &OcrOptions,
        on_progress: Option<ProgressCallback>,
        cancel: &CancelToken,
    ) -> CoreResult<BatchReport> {
        BatchRunner::new(self.engine.clone()).run(files, output_dir, options, on_progress, cancel)
    }

    /// Run a batch on a dedicated worker thread
    pub fn spawn_batch(
        &self,
        files: Vec<PathBuf>,
        output_dir: PathBuf,
        options: OcrOptions,
        on_progress: Option<ProgressCallback>,
    ) -> BatchHandle {
        batch::spawn_batch(
            self.engine.clone(),
            files,
            output_dir,
            options,
            on_progress,
        )
    }
}

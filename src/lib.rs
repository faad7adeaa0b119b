//! OCRmyPDF GUI core
//!
//! Desktop front-end core for the external OCRmyPDF command-line tool. This
//! crate presents OCR options as a structured record, translates them into
//! tool invocations, runs them singly or in batch on a worker thread, and
//! reports progress and results back through callbacks.
//!
//! OCR recognition, PDF manipulation, and text-layer embedding are all
//! performed by OCRmyPDF and Tesseract; this crate's whole job is driving
//! them predictably.

pub mod core;

// Re-exports
pub use crate::core::batch::{
    spawn_batch, BatchHandle, BatchRunner, CancelToken, ProgressCallback,
};
pub use crate::core::config::AppConfig;
pub use crate::core::engine::OcrEngine;
pub use crate::core::models::{
    BatchProgress, BatchReport, CollisionPolicy, CoreError, CoreResult, Job, JobResult,
    JobStatus, OcrOptions, OptimizeLevel, OutputNaming, OutputType,
};
pub use crate::core::profiles::ProfileStore;
pub use crate::core::service::OcrService;

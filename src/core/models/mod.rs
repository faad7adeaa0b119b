//! Core data models
//!
//! Data structures shared across the front-end core:
//! - OCR options and their enumerations
//! - Jobs, job results, and batch reports
//! - Error types

pub mod jobs;
pub mod options;
pub mod results;

// Re-exports for convenience
pub use jobs::{BatchProgress, BatchReport, Job, JobResult, JobStatus};
pub use options::{CollisionPolicy, OcrOptions, OptimizeLevel, OutputNaming, OutputType};
pub use results::{CoreError, CoreResult};

//! Result type definitions

use std::path::PathBuf;
use thiserror::Error;

/// Core error types
///
/// A non-zero exit from ocrmypdf itself is not an error here; it is surfaced
/// as a failed job result. These variants cover bad inputs and host-level
/// failures only.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid options: {0}")]
    Validation(String),

    #[error("Could not run external tool: {0}")]
    Execution(String),

    #[error("Output path already exists: {}", .0.display())]
    Collision(PathBuf),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Could not resolve configuration directory")]
    ConfigDir,
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

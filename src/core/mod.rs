//! Core engine modules
//!
//! Headless functionality behind the GUI:
//! - Configuration and named option profiles
//! - Models (options, jobs, results)
//! - Process I/O (command runner)
//! - OCR engine wrapper (invocation building, tool probing)
//! - Batch orchestration (worker thread, progress, cancellation)

pub mod batch;
pub mod config;
pub mod engine;
pub mod fs;
pub mod io;
pub mod models;
pub mod profiles;
pub mod service;

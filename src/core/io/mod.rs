//! Process I/O

pub mod runner;

pub use runner::{CommandOutput, CommandRunner, LogCallback};

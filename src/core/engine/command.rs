//! OCRmyPDF invocation builder
//!
//! Pure translation from an `OcrOptions` record to the argument vector passed
//! to the external tool. No side effects; identical inputs always produce an
//! identical token sequence.

use std::path::Path;

use crate::core::models::options::{OcrOptions, OptimizeLevel, OutputType};
use crate::core::models::results::CoreResult;

/// Name of the wrapped executable
pub const OCRMYPDF: &str = "ocrmypdf";

/// Build the full argument vector for one invocation, program name first
///
/// Validates the options before building; a `Validation` error here means no
/// process will ever be spawned for them. Fields at their default/absent
/// values are omitted. Token order mirrors the tool's documented usage:
/// optimization first, then language, then pre-processing flags, input and
/// output paths last.
pub fn build_invocation(
    input: &Path,
    output: &Path,
    options: &OcrOptions,
) -> CoreResult<Vec<String>> {
    options.validate()?;

    let mut cmd = vec![OCRMYPDF.to_string()];

    if options.optimize != OptimizeLevel::Off {
        cmd.push("-O".to_string());
        cmd.push(options.optimize.level().to_string());
    }

    cmd.push("-l".to_string());
    cmd.push(options.language_flag());

    if options.deskew {
        cmd.push("--deskew".to_string());
    }
    if options.rotate_pages {
        cmd.push("--rotate-pages".to_string());
    }
    if options.clean {
        cmd.push("--clean".to_string());
    }
    if options.force_ocr {
        cmd.push("--force-ocr".to_string());
    }

    if let Some(jobs) = options.jobs {
        cmd.push("--jobs".to_string());
        cmd.push(jobs.to_string());
    }

    if options.output_type != OutputType::Pdfa {
        cmd.push("--output-type".to_string());
        cmd.push(options.output_type.to_string());
    }

    cmd.push(input.display().to_string());
    cmd.push(output.display().to_string());

    Ok(cmd)
}

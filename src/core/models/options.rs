//! OCR option model
//!
//! A structured record of everything the UI can ask OCRmyPDF to do. Options
//! are passed by value between components and snapshotted into each job, so
//! there is no shared mutable option state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::results::{CoreError, CoreResult};

/// Output size/quality tradeoff forwarded to `ocrmypdf -O`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OptimizeLevel {
    /// No optimization (`-O 0`, the flag is omitted)
    Off,
    /// Lossless optimization (`-O 1`)
    Safe,
    /// Lossy JPEG/JBIG2 optimization (`-O 2`)
    Lossy,
    /// Aggressive lossy optimization (`-O 3`)
    Aggressive,
}

impl OptimizeLevel {
    /// Numeric level as passed on the command line
    pub fn level(&self) -> u8 {
        match self {
            OptimizeLevel::Off => 0,
            OptimizeLevel::Safe => 1,
            OptimizeLevel::Lossy => 2,
            OptimizeLevel::Aggressive => 3,
        }
    }
}

impl From<OptimizeLevel> for u8 {
    fn from(level: OptimizeLevel) -> Self {
        level.level()
    }
}

impl TryFrom<u8> for OptimizeLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OptimizeLevel::Off),
            1 => Ok(OptimizeLevel::Safe),
            2 => Ok(OptimizeLevel::Lossy),
            3 => Ok(OptimizeLevel::Aggressive),
            other => Err(format!("optimize level must be 0-3, got {}", other)),
        }
    }
}

impl fmt::Display for OptimizeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Output file type forwarded to `ocrmypdf --output-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// PDF/A (archival), the tool's own default
    #[default]
    Pdfa,
    /// Plain PDF
    Pdf,
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Pdfa => write!(f, "pdfa"),
            OutputType::Pdf => write!(f, "pdf"),
        }
    }
}

/// Output naming strategy for batch runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum OutputNaming {
    /// `scan.pdf` -> `scan<suffix>.pdf`
    Suffix(String),
    /// `scan.pdf` -> `<prefix>scan.pdf`
    Prefix(String),
    /// Keep the input file name; the only strategy allowed to resolve onto
    /// the input itself (in-place OCR when the output dir equals the input dir)
    Replace,
    /// Custom template with `{stem}` and `{ext}` placeholders
    Template(String),
}

impl Default for OutputNaming {
    fn default() -> Self {
        OutputNaming::Suffix("_ocr".to_string())
    }
}

/// What to do when a resolved output path already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Append a disambiguating `_1`, `_2`, ... before the extension
    #[default]
    Rename,
    /// Fail the job without invoking the tool
    Fail,
}

/// One complete set of OCR options
///
/// Maps field-for-field onto OCRmyPDF command-line flags; absent/default
/// fields are omitted from the invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOptions {
    /// Tesseract language codes, joined with `+` for `-l`
    pub languages: Vec<String>,

    /// Straighten skewed pages (`--deskew`)
    pub deskew: bool,

    /// Fix page rotation (`--rotate-pages`)
    pub rotate_pages: bool,

    /// Clean page images before OCR (`--clean`)
    pub clean: bool,

    /// OCR even when a text layer already exists (`--force-ocr`)
    pub force_ocr: bool,

    /// Output optimization level (`-O`)
    pub optimize: OptimizeLevel,

    /// Output file type (`--output-type`)
    pub output_type: OutputType,

    /// Tool-internal worker count (`--jobs`)
    pub jobs: Option<u32>,

    /// Output naming strategy for batch runs
    pub naming: OutputNaming,

    /// Collision policy for existing output paths
    pub on_collision: CollisionPolicy,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
            deskew: true,
            rotate_pages: true,
            clean: false,
            force_ocr: false,
            optimize: OptimizeLevel::Safe,
            output_type: OutputType::Pdfa,
            jobs: None,
            naming: OutputNaming::default(),
            on_collision: CollisionPolicy::default(),
        }
    }
}

impl OcrOptions {
    /// Validate the option set before any process is spawned
    pub fn validate(&self) -> CoreResult<()> {
        if self.languages.is_empty() {
            return Err(CoreError::Validation(
                "at least one OCR language must be selected".to_string(),
            ));
        }

        for code in &self.languages {
            if code.is_empty()
                || !code.chars().all(|c| c.is_ascii_lowercase() || c == '_')
            {
                return Err(CoreError::Validation(format!(
                    "'{}' is not a valid Tesseract language code",
                    code
                )));
            }
        }

        if let OutputNaming::Template(template) = &self.naming {
            if !template.contains("{stem}") {
                return Err(CoreError::Validation(
                    "naming template must contain the {stem} placeholder".to_string(),
                ));
            }
        }

        if self.jobs == Some(0) {
            return Err(CoreError::Validation(
                "jobs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Language list as the `-l` argument value (`eng+deu`)
    pub fn language_flag(&self) -> String {
        self.languages.join("+")
    }
}

//! OCRmyPDF GUI binary entry point
//!
//! A thin command-line surface over the same service facade the GUI uses:
//! single runs, batch runs with progress output, language listing, and
//! profile management.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocrmypdf_gui::core::batch::{CancelToken, ProgressCallback};
use ocrmypdf_gui::core::engine;
use ocrmypdf_gui::core::fs;
use ocrmypdf_gui::{
    BatchProgress, CollisionPolicy, OcrOptions, OcrService, OptimizeLevel, OutputNaming,
    OutputType,
};

#[derive(Parser, Debug)]
#[command(name = "ocrmypdf-gui")]
#[command(version, about = "Front-end for OCRmyPDF: batch OCR with profiles and progress", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// OCR a single PDF file
    Run {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file (default: `<input stem>_ocr.pdf` next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Named profile to start from
        #[arg(short, long)]
        profile: Option<String>,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// OCR multiple PDF files (or a whole directory) into an output directory
    Batch {
        /// Input PDF files or directories
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Recurse into subdirectories when an input is a directory
        #[arg(short, long)]
        recursive: bool,

        /// Named profile to start from
        #[arg(short, long)]
        profile: Option<String>,

        #[command(flatten)]
        ocr: OcrArgs,

        #[command(flatten)]
        naming: NamingArgs,
    },

    /// List installed Tesseract languages
    Langs,

    /// Manage named option profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    /// List saved profiles
    List,

    /// Save current options under a name
    Save {
        name: String,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Show a profile as JSON
    Show { name: String },

    /// Delete a profile
    Delete { name: String },
}

/// OCR option overrides applied on top of the defaults (or a profile)
#[derive(Args, Debug)]
struct OcrArgs {
    /// Tesseract language code(s); repeat for multiple (`-l eng -l deu`)
    #[arg(short = 'l', long = "language")]
    language: Vec<String>,

    /// Disable deskewing
    #[arg(long)]
    no_deskew: bool,

    /// Disable automatic page rotation
    #[arg(long)]
    no_rotate: bool,

    /// Clean page images before OCR
    #[arg(long)]
    clean: bool,

    /// OCR even when a text layer already exists
    #[arg(long)]
    force_ocr: bool,

    /// Optimization level (0-3)
    #[arg(short = 'O', long)]
    optimize: Option<u8>,

    /// Output file type
    #[arg(long, value_enum)]
    output_type: Option<OutputTypeArg>,

    /// Tool-internal worker count
    #[arg(long)]
    jobs: Option<u32>,
}

impl OcrArgs {
    /// Apply overrides to a base option set
    fn apply(&self, mut options: OcrOptions) -> Result<OcrOptions> {
        if !self.language.is_empty() {
            options.languages = self.language.clone();
        }
        if self.no_deskew {
            options.deskew = false;
        }
        if self.no_rotate {
            options.rotate_pages = false;
        }
        if self.clean {
            options.clean = true;
        }
        if self.force_ocr {
            options.force_ocr = true;
        }
        if let Some(level) = self.optimize {
            options.optimize = OptimizeLevel::try_from(level)
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Some(output_type) = self.output_type {
            options.output_type = output_type.into();
        }
        if let Some(jobs) = self.jobs {
            options.jobs = Some(jobs);
        }
        Ok(options)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputTypeArg {
    Pdfa,
    Pdf,
}

impl From<OutputTypeArg> for OutputType {
    fn from(value: OutputTypeArg) -> Self {
        match value {
            OutputTypeArg::Pdfa => OutputType::Pdfa,
            OutputTypeArg::Pdf => OutputType::Pdf,
        }
    }
}

/// Output naming and collision flags for batch runs
#[derive(Args, Debug)]
struct NamingArgs {
    /// Append a suffix to the input stem (default strategy, `_ocr`)
    #[arg(long, conflicts_with_all = ["prefix", "replace", "template"])]
    suffix: Option<String>,

    /// Prepend a prefix to the input name
    #[arg(long, conflicts_with_all = ["suffix", "replace", "template"])]
    prefix: Option<String>,

    /// Keep the input name (in-place when output dir equals input dir)
    #[arg(long, conflicts_with_all = ["suffix", "prefix", "template"])]
    replace: bool,

    /// Custom template with {stem} and {ext} placeholders
    #[arg(long, conflicts_with_all = ["suffix", "prefix", "replace"])]
    template: Option<String>,

    /// What to do when the output path already exists
    #[arg(long, value_enum, default_value_t = CollisionArg::Rename)]
    on_collision: CollisionArg,
}

impl NamingArgs {
    fn apply(&self, options: &mut OcrOptions) {
        if let Some(suffix) = &self.suffix {
            options.naming = OutputNaming::Suffix(suffix.clone());
        } else if let Some(prefix) = &self.prefix {
            options.naming = OutputNaming::Prefix(prefix.clone());
        } else if self.replace {
            options.naming = OutputNaming::Replace;
        } else if let Some(template) = &self.template {
            options.naming = OutputNaming::Template(template.clone());
        }
        options.on_collision = self.on_collision.into();
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CollisionArg {
    Rename,
    Fail,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(value: CollisionArg) -> Self {
        match value {
            CollisionArg::Rename => CollisionPolicy::Rename,
            CollisionArg::Fail => CollisionPolicy::Fail,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocrmypdf_gui=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut service = OcrService::new().context("could not initialize")?;

    match cli.command {
        Commands::Run {
            input,
            output,
            profile,
            ocr,
        } => {
            let options = ocr.apply(base_options(&service, profile.as_deref())?)?;
            let output = match output {
                Some(path) => path,
                None => {
                    let stem = input
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .context("input has no file name")?;
                    input.with_file_name(format!("{}_ocr.pdf", stem))
                }
            };

            let result = service.run_single(&input, &output, &options)?;
            println!("{}: {}", result.job.name(), result.status);
            if let Ok(meta) = std::fs::metadata(&result.job.output) {
                println!("  {} ({})", result.job.output.display(), fs::human_size(meta.len()));
            }
            if !result.is_success() {
                if !result.diagnostics.is_empty() {
                    eprintln!("{}", result.diagnostics);
                }
                bail!("OCR failed");
            }
        }

        Commands::Batch {
            inputs,
            output,
            recursive,
            profile,
            ocr,
            naming,
        } => {
            let mut options = ocr.apply(base_options(&service, profile.as_deref())?)?;
            naming.apply(&mut options);

            let files = collect_inputs(&inputs, recursive)?;
            if files.is_empty() {
                bail!("no PDF files to process");
            }

            let on_progress: ProgressCallback = Arc::new(|p: &BatchProgress| {
                println!("[{}/{}] {}", p.completed, p.total, p.current);
            });

            let report = service.run_batch(
                &files,
                &output,
                &options,
                Some(on_progress),
                &CancelToken::new(),
            )?;

            let written: u64 = report
                .results
                .iter()
                .filter(|r| r.is_success())
                .filter_map(|r| std::fs::metadata(&r.job.output).ok())
                .map(|m| m.len())
                .sum();
            println!("{}, {} written", report.summary(), fs::human_size(written));
            for result in report.results.iter().filter(|r| !r.is_success()) {
                println!("  {}: {}", result.job.name(), result.status);
            }
            if report.failed() > 0 {
                bail!("{} file(s) failed", report.failed());
            }
        }

        Commands::Langs => {
            let engine = service.engine();
            if !engine.is_available() {
                bail!("ocrmypdf was not found on PATH");
            }
            let languages = engine.available_languages();
            if languages.is_empty() {
                println!("No Tesseract languages found");
            }
            for code in languages {
                println!("{}", engine::language_name(code));
            }
        }

        Commands::Profile { command } => match command {
            ProfileCommands::List => {
                for name in service.list_profiles() {
                    println!("{}", name);
                }
            }
            ProfileCommands::Save { name, ocr } => {
                let options = ocr.apply(service.config().default_options.clone())?;
                options.validate()?;
                service.save_profile(&name, options)?;
                println!("Saved profile '{}'", name);
            }
            ProfileCommands::Show { name } => {
                let options = service.load_profile(&name)?;
                println!("{}", serde_json::to_string_pretty(&options)?);
            }
            ProfileCommands::Delete { name } => {
                service.delete_profile(&name)?;
                println!("Deleted profile '{}'", name);
            }
        },
    }

    Ok(())
}

/// Starting options: a named profile or the configured defaults
fn base_options(service: &OcrService, profile: Option<&str>) -> Result<OcrOptions> {
    match profile {
        Some(name) => Ok(service.load_profile(name)?),
        None => Ok(service.config().default_options.clone()),
    }
}

/// Expand files and directories into a flat PDF list, preserving input order
fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(fs::pdf_files_in_dir(input, recursive));
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

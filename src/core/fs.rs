//! File system helpers

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core::models::results::CoreResult;

/// PDF header magic
const PDF_MAGIC: &[u8; 5] = b"%PDF-";

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> CoreResult<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Check that a file exists, has a `.pdf` extension, and starts with `%PDF-`
pub fn is_valid_pdf(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    let is_pdf_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf_ext {
        return false;
    }

    let mut header = [0u8; 5];
    match File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
        Ok(()) => header == *PDF_MAGIC,
        Err(_) => false,
    }
}

/// Collect the valid PDF files in a directory, sorted by path
///
/// With `recursive` set, walks subdirectories as well.
pub fn pdf_files_in_dir(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_pdfs(dir, recursive, &mut files);
    files.sort();
    files
}

fn collect_pdfs(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "could not read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_pdfs(&path, recursive, out);
            }
        } else if is_valid_pdf(&path) {
            out.push(path);
        }
    }
}

/// Human-readable file size ("1.2 MB")
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} PB", size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_valid_pdf() {
        let dir = TempDir::new().unwrap();

        let good = dir.path().join("good.pdf");
        std::fs::write(&good, b"%PDF-1.7 content").unwrap();
        assert!(is_valid_pdf(&good));

        let upper = dir.path().join("upper.PDF");
        std::fs::write(&upper, b"%PDF-1.4").unwrap();
        assert!(is_valid_pdf(&upper));

        let fake = dir.path().join("fake.pdf");
        std::fs::write(&fake, b"not a pdf at all").unwrap();
        assert!(!is_valid_pdf(&fake));

        let wrong_ext = dir.path().join("doc.txt");
        std::fs::write(&wrong_ext, b"%PDF-1.4").unwrap();
        assert!(!is_valid_pdf(&wrong_ext));

        assert!(!is_valid_pdf(&dir.path().join("missing.pdf")));
    }

    #[test]
    fn test_pdf_files_in_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();

        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("c.pdf"), b"%PDF-1.4").unwrap();

        let flat = pdf_files_in_dir(dir.path(), false);
        assert_eq!(flat.len(), 2);
        assert!(flat[0].ends_with("a.pdf"));
        assert!(flat[1].ends_with("b.pdf"));

        let deep = pdf_files_in_dir(dir.path(), true);
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512.0 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}

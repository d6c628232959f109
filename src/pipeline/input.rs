//! Document reading and staging.
//!
//! The reader dispatches on the declared file name: `.pdf` goes through
//! pdfium text extraction, `.txt` is decoded as UTF-8, anything else is
//! rejected. The extracted text is then written to a [`StagedDocument`], a
//! named temporary file owned by the run. The file is removed when the guard
//! is dropped, so every exit path (success, bad quiz, failed model call)
//! leaves nothing behind.
//!
//! pdfium keeps thread-local state and is not async-safe, so PDF extraction
//! runs inside `spawn_blocking`.

use crate::error::QuizGenError;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// File formats the reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
}

impl DocumentFormat {
    /// Pick the format from a declared file name (suffix, case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, QuizGenError> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            return Ok(DocumentFormat::Pdf);
        }
        if lower.ends_with(".txt") {
            return Ok(DocumentFormat::Text);
        }

        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("<none>");
        Err(QuizGenError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }
}

/// Extract the full text of an uploaded document.
///
/// # Arguments
/// * `name`: declared file name; only its extension is used
/// * `bytes`: raw file contents
///
/// # Returns
/// The text with leading and trailing whitespace trimmed.
pub async fn read_document(name: &str, bytes: &[u8]) -> Result<String, QuizGenError> {
    let text = match DocumentFormat::from_name(name)? {
        DocumentFormat::Text => decode_text(name, bytes)?,
        DocumentFormat::Pdf => {
            let owned_name = name.to_string();
            let owned_bytes = bytes.to_vec();
            tokio::task::spawn_blocking(move || extract_pdf_text_blocking(&owned_name, &owned_bytes))
                .await
                .map_err(|e| QuizGenError::Internal(format!("PDF extraction task panicked: {}", e)))??
        }
    };

    let trimmed = text.trim();
    info!("Read '{}': {} chars", name, trimmed.chars().count());
    Ok(trimmed.to_string())
}

/// Read a local file and extract its text, dispatching on its file name.
pub async fn read_document_file(path: &Path) -> Result<String, QuizGenError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    // Reject unsupported names before touching the disk.
    DocumentFormat::from_name(&name)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| QuizGenError::read_error(path.display().to_string(), e))?;

    read_document(&name, &bytes).await
}

fn decode_text(name: &str, bytes: &[u8]) -> Result<String, QuizGenError> {
    let text = std::str::from_utf8(bytes).map_err(|e| QuizGenError::read_error(name, e))?;
    Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text).to_string())
}

/// Blocking PDF text extraction. Pages are joined with a newline in page order.
fn extract_pdf_text_blocking(name: &str, bytes: &[u8]) -> Result<String, QuizGenError> {
    let pdfium = bind_pdfium().map_err(|e| QuizGenError::read_error(name, e))?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| QuizGenError::read_error(name, format!("not a readable PDF: {:?}", e)))?;

    let pages = document.pages();
    debug!("PDF '{}' loaded: {} pages", name, pages.len());

    let mut parts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        // A page without a text layer contributes nothing rather than failing.
        let text = match page.text() {
            Ok(text) => text.all(),
            Err(e) => {
                debug!("Page {}: no extractable text ({:?})", idx + 1, e);
                String::new()
            }
        };
        parts.push(text);
    }

    Ok(parts.join("\n"))
}

/// Bind to the pdfium library named by `PDFIUM_LIB_PATH`, else the system copy.
fn bind_pdfium() -> Result<Pdfium, String> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path)
            .map_err(|e| format!("failed to load pdfium from '{}': {:?}", path, e))?,
        _ => Pdfium::bind_to_system_library().map_err(|e| {
            format!(
                "pdfium library not found ({:?}); set PDFIUM_LIB_PATH=/path/to/libpdfium",
                e
            )
        })?,
    };
    Ok(Pdfium::new(bindings))
}

/// Extracted document text staged in a temporary file for one run.
///
/// Dropping the guard deletes the file.
#[derive(Debug)]
pub struct StagedDocument {
    file: NamedTempFile,
}

impl StagedDocument {
    /// Write `text` to a new temporary file.
    ///
    /// # Arguments
    /// * `text`: document text to stage
    /// * `dir`: staging directory; the OS temp dir when `None`
    pub fn stage(text: &str, dir: Option<&Path>) -> Result<Self, QuizGenError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("quizgen-").suffix(".txt");

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| QuizGenError::Internal(format!("tempfile: {e}")))?;

        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| QuizGenError::Internal(format!("tempfile write: {e}")))?;

        debug!("Staged {} bytes at {}", text.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged text back.
    pub async fn read_text(&self) -> Result<String, QuizGenError> {
        tokio::fs::read_to_string(self.path())
            .await
            .map_err(|e| QuizGenError::read_error(self.path().display().to_string(), e))
    }
}

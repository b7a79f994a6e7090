//! Plain-text extraction from source documents.
//!
//! Readers are chosen by file extension. The PDF and DOCX readers sit
//! behind the `pdf` and `docx` cargo features; a build without one
//! reports [`Error::MissingDependency`] for that format.

#[cfg(feature = "docx")]
mod docx;
#[cfg(feature = "pdf")]
mod pdf;

use deckgen_core::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Maximum number of PDF pages read.
pub const MAX_PDF_PAGES: usize = 50;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Txt,
}

impl DocumentType {
    /// Match a file extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format-specific counts reported alongside the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentCounts {
    Pdf {
        page_count: usize,
        pages_processed: usize,
    },
    Docx {
        paragraph_count: usize,
    },
    Txt {
        line_count: usize,
    },
}

/// Text extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedDocument {
    pub file_type: DocumentType,
    pub file_name: String,
    pub full_text: String,
    /// Whitespace-separated tokens in `full_text`.
    pub word_count: usize,
    #[serde(flatten)]
    pub counts: DocumentCounts,
}

impl ExtractedDocument {
    fn new(file_type: DocumentType, path: &Path, full_text: String, counts: DocumentCounts) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_type,
            file_name,
            word_count: full_text.split_whitespace().count(),
            full_text,
            counts,
        }
    }

    /// The first `chars` characters of the text.
    pub fn preview(&self, chars: usize) -> &str {
        match self.full_text.char_indices().nth(chars) {
            Some((end, _)) => &self.full_text[..end],
            None => &self.full_text,
        }
    }
}

/// Extract the text of a PDF, DOCX or TXT document.
pub fn extract_document(path: impl AsRef<Path>) -> Result<ExtractedDocument> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_type = DocumentType::from_extension(&ext).ok_or_else(|| {
        Error::UnsupportedFormat(format!(
            "'.{}' (supported: .pdf, .docx, .txt)",
            ext.to_ascii_lowercase()
        ))
    })?;

    log::debug!("Extracting {} text from {}", file_type, path.display());

    let (text, counts) = match file_type {
        DocumentType::Pdf => read_pdf(path)?,
        DocumentType::Docx => read_docx(path)?,
        DocumentType::Txt => read_txt(path)?,
    };

    let document = ExtractedDocument::new(file_type, path, text, counts);
    log::info!(
        "Extracted {} words from {}",
        document.word_count,
        document.file_name
    );
    Ok(document)
}

#[cfg(feature = "pdf")]
fn read_pdf(path: &Path) -> Result<(String, DocumentCounts)> {
    pdf::read(path)
}

#[cfg(not(feature = "pdf"))]
fn read_pdf(_path: &Path) -> Result<(String, DocumentCounts)> {
    Err(Error::MissingDependency(
        "PDF extraction requires the `pdf` feature".to_string(),
    ))
}

#[cfg(feature = "docx")]
fn read_docx(path: &Path) -> Result<(String, DocumentCounts)> {
    docx::read(path)
}

#[cfg(not(feature = "docx"))]
fn read_docx(_path: &Path) -> Result<(String, DocumentCounts)> {
    Err(Error::MissingDependency(
        "DOCX extraction requires the `docx` feature".to_string(),
    ))
}

/// Read a text file, replacing invalid UTF-8.
fn read_txt(path: &Path) -> Result<(String, DocumentCounts)> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let line_count = text.split('\n').count();
    Ok((text, DocumentCounts::Txt { line_count }))
}

use crate::{DocumentCounts, MAX_PDF_PAGES};
use deckgen_core::{Error, Result};
use lopdf::Document;
use std::path::Path;

/// Text of the first [`MAX_PDF_PAGES`] pages, each followed by a blank line.
pub(crate) fn read(path: &Path) -> Result<(String, DocumentCounts)> {
    let doc = Document::load(path)
        .map_err(|e| Error::UnsupportedFormat(format!("Unreadable PDF: {}", e)))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let page_count = page_numbers.len();
    let pages_processed = page_count.min(MAX_PDF_PAGES);

    let mut text = String::new();
    for page in &page_numbers[..pages_processed] {
        let page_text = doc.extract_text(&[*page]).unwrap_or_else(|e| {
            log::warn!("No text extracted from page {}: {}", page, e);
            String::new()
        });
        text.push_str(&page_text);
        text.push_str("\n\n");
    }

    if page_count > MAX_PDF_PAGES {
        log::info!(
            "Read {} of {} pages from {}",
            pages_processed,
            page_count,
            path.display()
        );
    }

    Ok((
        text,
        DocumentCounts::Pdf {
            page_count,
            pages_processed,
        },
    ))
}

//! DOCX body text: the non-empty top-level paragraphs of `word/document.xml`.

use crate::DocumentCounts;
use deckgen_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

pub(crate) fn read(path: &Path) -> Result<(String, DocumentCounts)> {
    let file = File::open(path)?;
    let xml = document_xml(BufReader::new(file))?;
    let paragraphs = body_paragraphs(&xml)?;
    log::debug!("Read {} paragraphs from {}", paragraphs.len(), path.display());

    let paragraph_count = paragraphs.len();
    Ok((paragraphs.join("\n"), DocumentCounts::Docx { paragraph_count }))
}

fn document_xml<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| Error::Zip(format!("Failed to open DOCX: {}", e)))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| Error::Zip(format!("Missing {}: {}", DOCUMENT_PART, e)))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Paragraph texts in document order, skipping blank ones and those
/// nested in tables or text boxes.
fn body_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut table_depth = 0usize;
    let mut textbox_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"tbl" => table_depth += 1,
                b"txbxContent" => textbox_depth += 1,
                b"p" if table_depth == 0 && textbox_depth == 0 => current = Some(String::new()),
                b"t" if textbox_depth == 0 => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if textbox_depth == 0 => {
                if let Some(text) = current.as_mut() {
                    match local_name(e.name().as_ref()) {
                        b"tab" => text.push('\t'),
                        b"br" | b"cr" => text.push('\n'),
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (true, Some(text)) = (in_text, current.as_mut()) {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"txbxContent" => textbox_depth = textbox_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" if table_depth == 0 && textbox_depth == 0 => {
                    if let Some(text) = current.take() {
                        if !text.trim().is_empty() {
                            paragraphs.push(text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing {}: {}", DOCUMENT_PART, e)));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

//! In-memory OPC package: the ZIP parts of a `.pptx` file, their
//! relationships and content types.

use crate::xml::{attr, escape, local_name};
use deckgen_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Relationship type namespace prefix for office documents.
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Part name of the content types stream.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Largest buffer reserved up front for a part, whatever its entry header claims.
const MAX_PREALLOCATED_PART: u64 = 1 << 20;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// All parts of a package, keyed by ZIP entry name (no leading slash).
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Open a package from disk.
    ///
    /// Fails with [`Error::NotFound`] before reading anything if the file is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read every part of a ZIP archive into memory.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut content = Vec::with_capacity(initial_capacity(file.size()));
            file.read_to_end(&mut content)
                .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", name, e)))?;
            parts.insert(name, content);
        }

        log::debug!("Loaded package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// A part decoded as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<String> {
        let bytes = self
            .part(name)
            .ok_or_else(|| Error::InvalidTemplate(format!("missing part '{}'", name)))?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Insert or replace a part.
    pub fn set_part(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), content.into());
    }

    /// Remove a part, returning its content.
    pub fn remove_part(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name)
    }

    /// Names of all parts.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Relationships whose source is `source_part` (`""` for the package root).
    ///
    /// A part without a relationships part has none.
    pub fn relationships(&self, source_part: &str) -> Result<Vec<Relationship>> {
        let rels_part = rels_path(source_part);
        match self.part(&rels_part) {
            Some(bytes) => parse_relationships(&String::from_utf8_lossy(bytes)),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the relationships of `source_part`.
    pub fn set_relationships(&mut self, source_part: &str, rels: &[Relationship]) {
        self.set_part(rels_path(source_part), write_relationships(rels));
    }

    /// Name of the main presentation part.
    pub fn main_part(&self) -> Result<String> {
        let from_root = self
            .relationships("")?
            .into_iter()
            .find(|r| r.is_type("officeDocument"))
            .map(|r| resolve_target("", &r.target));

        match from_root {
            Some(name) if self.contains(&name) => Ok(name),
            _ if self.contains("ppt/presentation.xml") => Ok("ppt/presentation.xml".to_string()),
            _ => Err(Error::InvalidTemplate(
                "package has no presentation part".to_string(),
            )),
        }
    }

    /// Parsed `[Content_Types].xml`.
    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(&self.part_str(CONTENT_TYPES_PART)?)
    }

    /// Write the package as a ZIP archive, content types first.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|(name, _)| name.as_str() == CONTENT_TYPES_PART)
            .chain(
                self.parts
                    .iter()
                    .filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART),
            );

        for (name, content) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(content)?;
        }

        zip.finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
        Ok(())
    }

    /// Write the package to a file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.write_to(file)
    }
}

/// A relationship from one part to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Create an internal relationship of the given short type, e.g. `slide`.
    pub fn internal(id: impl Into<String>, short_type: &str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: format!("{}/{}", REL_NS, short_type),
            target: target.into(),
            external: false,
        }
    }

    /// Whether the relationship type ends with `/<short_type>`.
    pub fn is_type(&self, short_type: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .is_some_and(|last| last == short_type)
    }
}

/// The first `rIdN` not used by any relationship in `rels`.
pub fn next_rel_id(rels: &[Relationship]) -> String {
    let max = rels
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut rels = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let (Some(id), Some(rel_type), Some(target)) =
                    (attr(e, b"Id"), attr(e, b"Type"), attr(e, b"Target"))
                else {
                    log::warn!("Skipping incomplete relationship");
                    continue;
                };
                let external = attr(e, b"TargetMode").is_some_and(|m| m == "External");
                rels.push(Relationship {
                    id,
                    rel_type,
                    target,
                    external,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }

    Ok(rels)
}

fn write_relationships(rels: &[Relationship]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}""#,
            escape(&rel.id),
            escape(&rel.rel_type),
            escape(&rel.target)
        );
        if rel.external {
            xml.push_str(r#" TargetMode="External""#);
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    xml
}

/// The `[Content_Types].xml` stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// (extension, content type)
    pub defaults: Vec<(String, String)>,
    /// (part name without leading slash, content type)
    pub overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attr(e, b"Extension"), attr(e, b"ContentType"))
                            {
                                types.defaults.push((ext, ct));
                            }
                        }
                        b"Override" => {
                            if let (Some(part), Some(ct)) =
                                (attr(e, b"PartName"), attr(e, b"ContentType"))
                            {
                                types
                                    .overrides
                                    .push((part.trim_start_matches('/').to_string(), ct));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing content types: {}", e)));
                }
                _ => {}
            }
        }

        Ok(types)
    }

    /// Add or replace the override for a part.
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        self.remove_override(part);
        self.overrides
            .push((part.to_string(), content_type.to_string()));
    }

    /// Drop the override for a part, if present.
    pub fn remove_override(&mut self, part: &str) {
        self.overrides.retain(|(name, _)| name != part);
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(XML_DECL);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, ct) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext),
                escape(ct)
            );
        }
        for (part, ct) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                escape(part),
                escape(ct)
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Directory of a part name (`ppt/slides/slide1.xml` -> `ppt/slides`).
fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Name of the relationships part for `part` (`""` is the package root).
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against its source part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = part_dir(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Relative target from `source_part` to `target_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = part_dir(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let to: Vec<&str> = target_part.split('/').collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();
    // the file name segment of `to` is never shared
    let common = common.min(to.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Read buffer size for a ZIP entry whose header declares `declared` bytes.
fn initial_capacity(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATED_PART) as usize
}

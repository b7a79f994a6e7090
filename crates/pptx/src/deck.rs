//! The donor deck: a template package emptied of its slides, to which new
//! slides are added on the template's own layouts.

use crate::package::{
    next_rel_id, relative_target, rels_path, resolve_target, Package, Relationship,
    CONTENT_TYPES_PART, REL_NS,
};
use crate::parser::{LayoutPart, PptxParser};
use crate::shapes::{slide_xml, SlideShape, TextBody};
use crate::xml::{local_name, prefix};
use deckgen_core::descriptor::PanelStyle;
use deckgen_core::{Error, Position, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::Path;

const SLIDE_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// First id of a slide in `p:sldIdLst`.
const FIRST_SLIDE_ID: u32 = 256;

/// Presentation children that follow `p:sldIdLst`.
const AFTER_SLIDE_LIST: &[&[u8]] = &[
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// Relationship types owned by a slide and removed with it.
const SLIDE_OWNED: &[&str] = &["notesSlide", "comments"];

/// A slide added to the deck.
#[derive(Debug, Clone)]
pub struct GeneratedSlide {
    pub layout_index: usize,
    pub shapes: Vec<SlideShape>,
}

impl GeneratedSlide {
    /// Add a text box named after its shape id.
    pub fn add_text_box(&mut self, frame: Position, body: TextBody) {
        let name = format!("TextBox {}", self.shapes.len() + 1);
        self.shapes.push(SlideShape::TextBox { name, frame, body });
    }

    /// Add a filled and outlined rectangle.
    pub fn add_rectangle(&mut self, frame: Position, panel: PanelStyle, body: TextBody) {
        let name = format!("Rectangle {}", self.shapes.len() + 1);
        self.shapes.push(SlideShape::Rectangle {
            name,
            frame,
            panel,
            body,
        });
    }

    /// Put `body` into the first title placeholder. Returns false when the
    /// slide has no title placeholder.
    pub fn set_title_placeholder(&mut self, body: TextBody) -> bool {
        for shape in &mut self.shapes {
            if let SlideShape::Placeholder {
                ph_type,
                body: slot,
                ..
            } = shape
            {
                if ph_type.is_title() {
                    *slot = Some(body);
                    return true;
                }
            }
        }
        false
    }

    pub fn has_title_placeholder(&self) -> bool {
        self.shapes.iter().any(|s| {
            matches!(s, SlideShape::Placeholder { ph_type, .. } if ph_type.is_title())
        })
    }
}

/// A template package with its original slides purged.
#[derive(Debug, Clone)]
pub struct DonorDeck {
    package: Package,
    main_part: String,
    layouts: Vec<LayoutPart>,
    slides: Vec<GeneratedSlide>,
}

impl DonorDeck {
    /// Open a template and purge its slides.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let package = Package::open(path)?;
        log::debug!("Opened donor deck {}", path.display());
        Self::from_package(package)
    }

    /// Purge the slides of a loaded package.
    pub fn from_package(mut package: Package) -> Result<Self> {
        let main_part = package.main_part()?;
        let layouts = PptxParser::new().parse_layouts(&package)?;

        let rels = package.relationships(&main_part)?;
        let mut removed = BTreeSet::new();
        for rel in rels.iter().filter(|r| r.is_type("slide")) {
            let slide_part = resolve_target(&main_part, &rel.target);
            purge_slide(&mut package, &slide_part, &mut removed)?;
        }
        let kept: Vec<Relationship> = rels.into_iter().filter(|r| !r.is_type("slide")).collect();
        package.set_relationships(&main_part, &kept);

        let presentation = package.part_str(&main_part)?;
        package.set_part(main_part.clone(), rewrite_slide_list(&presentation, &[])?);

        let mut types = package.content_types()?;
        for part in &removed {
            types.remove_override(part);
        }
        package.set_part(CONTENT_TYPES_PART, types.to_xml());

        log::debug!(
            "Purged {} parts; {} layouts available",
            removed.len(),
            layouts.len()
        );

        Ok(Self {
            package,
            main_part,
            layouts,
            slides: Vec::new(),
        })
    }

    pub fn layouts(&self) -> &[LayoutPart] {
        &self.layouts
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Number of slides added since the deck was opened.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[GeneratedSlide] {
        &self.slides
    }

    /// Add a slide on a layout, cloning the layout's placeholders except
    /// date, footer and slide number.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<&mut GeneratedSlide> {
        if self.layouts.is_empty() {
            return Err(Error::InvalidTemplate("template has no slide layouts".to_string()));
        }
        let layout = self.layouts.get(layout_index).ok_or_else(|| {
            Error::InvalidTemplate(format!(
                "layout {} out of range ({} layouts)",
                layout_index,
                self.layouts.len()
            ))
        })?;

        let shapes = layout
            .placeholders
            .iter()
            .filter(|p| !p.placeholder_type.is_chrome())
            .map(|p| SlideShape::placeholder(p.name.clone(), p.placeholder_type, p.placeholder_idx))
            .collect();

        self.slides.push(GeneratedSlide {
            layout_index,
            shapes,
        });
        let count = self.slides.len();
        Ok(&mut self.slides[count - 1])
    }

    /// The package with the added slides written in.
    pub fn to_package(&self) -> Result<Package> {
        let mut package = self.package.clone();
        let mut types = package.content_types()?;
        let mut pres_rels = package.relationships(&self.main_part)?;
        let mut slide_list = Vec::with_capacity(self.slides.len());

        let mut number = 1;
        for (i, slide) in self.slides.iter().enumerate() {
            let slide_part = loop {
                let candidate = format!("ppt/slides/slide{}.xml", number);
                number += 1;
                if !package.contains(&candidate) {
                    break candidate;
                }
            };

            let layout = &self.layouts[slide.layout_index];
            package.set_part(slide_part.clone(), slide_xml(&slide.shapes));
            package.set_relationships(
                &slide_part,
                &[Relationship::internal(
                    "rId1",
                    "slideLayout",
                    relative_target(&slide_part, &layout.part_name),
                )],
            );
            types.set_override(&slide_part, SLIDE_CONTENT_TYPE);

            let rid = next_rel_id(&pres_rels);
            pres_rels.push(Relationship::internal(
                rid.clone(),
                "slide",
                relative_target(&self.main_part, &slide_part),
            ));
            slide_list.push((FIRST_SLIDE_ID + i as u32, rid));
        }

        package.set_relationships(&self.main_part, &pres_rels);
        let presentation = package.part_str(&self.main_part)?;
        package.set_part(
            self.main_part.clone(),
            rewrite_slide_list(&presentation, &slide_list)?,
        );
        package.set_part(CONTENT_TYPES_PART, types.to_xml());

        Ok(package)
    }

    /// Write the deck to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_package()?.save(path)?;
        log::info!("Saved {} slides to {}", self.slides.len(), path.display());
        Ok(())
    }
}

/// Remove a slide part along with its notes, comments and relationships.
fn purge_slide(package: &mut Package, slide_part: &str, removed: &mut BTreeSet<String>) -> Result<()> {
    for rel in package.relationships(slide_part)? {
        if rel.external || !SLIDE_OWNED.iter().any(|t| rel.is_type(t)) {
            continue;
        }
        let owned = resolve_target(slide_part, &rel.target);
        package.remove_part(&rels_path(&owned));
        if package.remove_part(&owned).is_some() {
            removed.insert(owned);
        }
    }
    package.remove_part(&rels_path(slide_part));
    if package.remove_part(slide_part).is_some() {
        removed.insert(slide_part.to_string());
    }
    Ok(())
}

/// Replace the `sldIdLst` of a presentation part.
///
/// Any existing list is dropped. When `slides` is non-empty a new list is
/// written in schema position, before `sldSz` and the elements after it.
fn rewrite_slide_list(xml: &str, slides: &[(u32, String)]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let xml_err = |e: quick_xml::Error| Error::Xml(format!("Error rewriting slide list: {}", e));

    let mut depth = 0usize;
    let mut skipping = 0usize;
    let mut inserted = slides.is_empty();
    let mut names = ListNames::default();

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        if skipping > 0 {
            match event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(ref e) => {
                let name = e.name();
                if depth == 0 {
                    names = ListNames::from_root(e);
                } else if depth == 1 {
                    let local = local_name(name.as_ref());
                    if local == b"sldIdLst" {
                        skipping = 1;
                        continue;
                    }
                    if !inserted && AFTER_SLIDE_LIST.contains(&local) {
                        write_slide_list(&mut writer, &names, slides).map_err(xml_err)?;
                        inserted = true;
                    }
                }
                depth += 1;
                writer.write_event(event.clone()).map_err(xml_err)?;
            }
            Event::Empty(ref e) => {
                if depth == 1 {
                    let name = e.name();
                    let local = local_name(name.as_ref());
                    if local == b"sldIdLst" {
                        continue;
                    }
                    if !inserted && AFTER_SLIDE_LIST.contains(&local) {
                        write_slide_list(&mut writer, &names, slides).map_err(xml_err)?;
                        inserted = true;
                    }
                }
                writer.write_event(event.clone()).map_err(xml_err)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !inserted {
                    write_slide_list(&mut writer, &names, slides).map_err(xml_err)?;
                    inserted = true;
                }
                writer.write_event(event.clone()).map_err(xml_err)?;
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(xml_err)?,
        }
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::Xml(format!("Presentation part is not UTF-8: {}", e)))
}

/// Qualified names used when writing a new slide list.
#[derive(Debug)]
struct ListNames {
    /// Prefix of the presentation element, e.g. `p`.
    element_prefix: Option<String>,
    /// Prefix bound to the relationships namespace, if declared on the root.
    rel_prefix: Option<String>,
}

impl Default for ListNames {
    fn default() -> Self {
        Self {
            element_prefix: Some("p".to_string()),
            rel_prefix: None,
        }
    }
}

impl ListNames {
    fn from_root(root: &BytesStart) -> Self {
        let rel_prefix = root.attributes().flatten().find_map(|a| {
            let key = a.key.as_ref();
            let declared = key.strip_prefix(b"xmlns:")?;
            (a.value.as_ref() == REL_NS.as_bytes())
                .then(|| String::from_utf8_lossy(declared).into_owned())
        });
        Self {
            element_prefix: prefix(root.name().as_ref()),
            rel_prefix,
        }
    }

    fn qualify(&self, local: &str) -> String {
        match &self.element_prefix {
            Some(p) => format!("{}:{}", p, local),
            None => local.to_string(),
        }
    }
}

fn write_slide_list<W: std::io::Write>(
    writer: &mut Writer<W>,
    names: &ListNames,
    slides: &[(u32, String)],
) -> std::result::Result<(), quick_xml::Error> {
    let list_name = names.qualify("sldIdLst");
    let mut list = BytesStart::new(list_name.as_str());
    let rel_prefix = match &names.rel_prefix {
        Some(p) => p.clone(),
        None => {
            list.push_attribute(("xmlns:r", REL_NS));
            "r".to_string()
        }
    };
    writer.write_event(Event::Start(list))?;

    let rel_attr = format!("{}:id", rel_prefix);
    for (id, rid) in slides {
        let mut entry = BytesStart::new(names.qualify("sldId"));
        entry.push_attribute(("id", id.to_string().as_str()));
        entry.push_attribute((rel_attr.as_str(), rid.as_str()));
        writer.write_event(Event::Empty(entry))?;
    }

    writer.write_event(Event::End(BytesEnd::new(list_name.as_str())))?;
    Ok(())
}

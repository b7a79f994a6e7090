//! PPTX template parser: slide size, layouts with their placeholder slots,
//! and the shapes of existing slides.

use crate::package::{resolve_target, Package};
use crate::xml::{attr, attr_bool, attr_i64, local_name, rel_id};
use deckgen_core::units::centipoints_to_emu;
use deckgen_core::{
    Error, LayoutRecord, PlaceholderType, Position, Result, RunStyle, ShapeKind, ShapeSample,
    SlideSample, SlotRecord,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Default slide size when `p:sldSz` is absent (10in x 7.5in).
const DEFAULT_SLIDE_SIZE: (i64, i64) = (9_144_000, 6_858_000);

/// Everything read from a template package.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    /// Main presentation part name.
    pub main_part: String,
    pub slide_width_emu: i64,
    pub slide_height_emu: i64,
    /// Layouts of the first slide master, in source order.
    pub layouts: Vec<LayoutPart>,
    /// Existing slides in presentation order.
    pub slides: Vec<SlideSample>,
}

/// A layout part and its extracted record.
#[derive(Debug, Clone)]
pub struct LayoutPart {
    /// Part name, e.g. `ppt/slideLayouts/slideLayout1.xml`.
    pub part_name: String,
    pub record: LayoutRecord,
    /// Every named placeholder in tree order, including name duplicates.
    pub placeholders: Vec<SlotRecord>,
}

/// Parser for PPTX templates.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a template file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedTemplate> {
        let package = Package::open(path)?;
        self.parse(&package)
    }

    /// Parse a loaded package.
    pub fn parse(&self, package: &Package) -> Result<ParsedTemplate> {
        let main_part = package.main_part()?;
        let presentation = self.read_presentation(package, &main_part)?;
        let layouts = self.read_layouts(package, &main_part, &presentation)?;

        let rels = package.relationships(&main_part)?;
        let mut slides = Vec::with_capacity(presentation.slide_rids.len());
        for (idx, rid) in presentation.slide_rids.iter().enumerate() {
            let Some(rel) = rels.iter().find(|r| &r.id == rid) else {
                log::warn!("Slide relationship {} not found, skipping", rid);
                continue;
            };
            let slide_part = resolve_target(&main_part, &rel.target);
            slides.push(self.read_slide(package, &slide_part, slides.len(), &layouts)?);
            log::debug!("Read slide {} from {}", idx, slide_part);
        }

        Ok(ParsedTemplate {
            main_part,
            slide_width_emu: presentation.slide_size.0,
            slide_height_emu: presentation.slide_size.1,
            layouts,
            slides,
        })
    }

    /// Read only the layouts of a package.
    pub fn parse_layouts(&self, package: &Package) -> Result<Vec<LayoutPart>> {
        let main_part = package.main_part()?;
        let presentation = self.read_presentation(package, &main_part)?;
        self.read_layouts(package, &main_part, &presentation)
    }

    fn read_presentation(&self, package: &Package, main_part: &str) -> Result<PresentationInfo> {
        let xml = package.part_str(main_part)?;
        let mut info = PresentationInfo {
            slide_size: DEFAULT_SLIDE_SIZE,
            master_rids: Vec::new(),
            slide_rids: Vec::new(),
        };

        let mut reader = Reader::from_str(&xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"sldMasterId" => info.master_rids.extend(rel_id(e)),
                        b"sldId" => info.slide_rids.extend(rel_id(e)),
                        b"sldSz" => {
                            if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx"), attr_i64(e, b"cy")) {
                                info.slide_size = (cx, cy);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing {}: {}", main_part, e)));
                }
                _ => {}
            }
        }

        Ok(info)
    }

    fn read_layouts(
        &self,
        package: &Package,
        main_part: &str,
        presentation: &PresentationInfo,
    ) -> Result<Vec<LayoutPart>> {
        let rels = package.relationships(main_part)?;
        let master_part = presentation
            .master_rids
            .first()
            .and_then(|rid| rels.iter().find(|r| &r.id == rid))
            .or_else(|| rels.iter().find(|r| r.is_type("slideMaster")))
            .map(|r| resolve_target(main_part, &r.target));

        let Some(master_part) = master_part else {
            log::warn!("Template has no slide master; no layouts extracted");
            return Ok(Vec::new());
        };

        let master_xml = package.part_str(&master_part)?;
        let master_tree = parse_shape_tree(&master_xml)?;
        let master_placeholders: Vec<(PlaceholderType, Position)> = master_tree
            .shapes
            .iter()
            .filter_map(|s| {
                let (ph_type, _) = s.placeholder?;
                Some((ph_type, s.position()?))
            })
            .collect();

        let master_rels = package.relationships(&master_part)?;
        let layout_parts: Vec<String> = if master_tree.layout_rids.is_empty() {
            master_rels
                .iter()
                .filter(|r| r.is_type("slideLayout"))
                .map(|r| resolve_target(&master_part, &r.target))
                .collect()
        } else {
            master_tree
                .layout_rids
                .iter()
                .filter_map(|rid| master_rels.iter().find(|r| &r.id == rid))
                .map(|r| resolve_target(&master_part, &r.target))
                .collect()
        };

        let mut layouts = Vec::with_capacity(layout_parts.len());
        for (idx, part_name) in layout_parts.into_iter().enumerate() {
            let xml = package.part_str(&part_name)?;
            let tree = parse_shape_tree(&xml)?;

            let mut record = LayoutRecord::new(idx, tree.name.clone().unwrap_or_default());
            record.total_shapes = tree.shapes.len();

            let mut placeholders = Vec::new();
            for shape in &tree.shapes {
                let Some((ph_type, ph_idx)) = shape.placeholder else {
                    continue;
                };
                if shape.name.is_empty() {
                    log::debug!("Layout {}: skipping unnamed placeholder", idx);
                    continue;
                }

                let position = shape.position().or_else(|| {
                    let base = ph_type.master_base();
                    master_placeholders
                        .iter()
                        .find(|(t, _)| *t == base)
                        .map(|(_, p)| *p)
                });

                let slot = SlotRecord {
                    placeholder_type: ph_type,
                    placeholder_idx: ph_idx,
                    name: shape.name.clone(),
                    position: position.unwrap_or_default(),
                    has_text_frame: shape.has_text_body,
                };
                if let Some(previous) = record.insert_slot(slot.clone()) {
                    log::debug!(
                        "Layout {}: placeholder name '{}' reused; idx {} replaced by {}",
                        idx,
                        previous.name,
                        previous.placeholder_idx,
                        ph_idx
                    );
                }
                placeholders.push(slot);
            }

            log::debug!(
                "Layout {} '{}': {} slots, {} shapes",
                idx,
                record.layout_name,
                record.slots.len(),
                record.total_shapes
            );
            layouts.push(LayoutPart {
                part_name,
                record,
                placeholders,
            });
        }

        Ok(layouts)
    }

    fn read_slide(
        &self,
        package: &Package,
        slide_part: &str,
        index: usize,
        layouts: &[LayoutPart],
    ) -> Result<SlideSample> {
        let xml = package.part_str(slide_part)?;
        let tree = parse_shape_tree(&xml)?;

        let layout = package
            .relationships(slide_part)?
            .into_iter()
            .find(|r| r.is_type("slideLayout"))
            .map(|r| resolve_target(slide_part, &r.target))
            .and_then(|name| layouts.iter().find(|l| l.part_name == name));

        let mut slide = SlideSample::new(index);
        for shape in tree.shapes {
            let inherited = || {
                let (_, idx) = shape.placeholder?;
                layout?
                    .placeholders
                    .iter()
                    .find(|p| p.placeholder_idx == idx)
                    .map(|p| p.position)
            };
            let position = shape.position().or_else(inherited).unwrap_or_default();

            slide.shapes.push(ShapeSample {
                name: shape.name.clone(),
                kind: shape.kind(),
                position,
                text: shape.text(),
                first_run: shape.paragraphs.first().and_then(|p| p.first_run.clone()),
                fill_color: shape.fill_color.clone(),
            });
        }

        Ok(slide)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct PresentationInfo {
    slide_size: (i64, i64),
    master_rids: Vec<String>,
    slide_rids: Vec<String>,
}

/// Kind of top-level element found in a shape tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Shape,
    Picture,
    Group,
    GraphicFrame,
    Connector,
    ContentPart,
}

impl Element {
    fn from_local(name: &[u8]) -> Option<Self> {
        match name {
            b"sp" => Some(Self::Shape),
            b"pic" => Some(Self::Picture),
            b"grpSp" => Some(Self::Group),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"cxnSp" => Some(Self::Connector),
            b"contentPart" => Some(Self::ContentPart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct RawParagraph {
    text: String,
    first_run: Option<RunStyle>,
}

/// A top-level shape as read from XML.
#[derive(Debug, Clone)]
struct RawShape {
    element: Element,
    name: String,
    placeholder: Option<(PlaceholderType, u32)>,
    text_box: bool,
    xfrm: Option<(i64, i64, i64, i64)>,
    has_text_body: bool,
    paragraphs: Vec<RawParagraph>,
    fill_color: Option<String>,
}

impl RawShape {
    fn new(element: Element) -> Self {
        Self {
            element,
            name: String::new(),
            placeholder: None,
            text_box: false,
            xfrm: None,
            has_text_body: false,
            paragraphs: Vec::new(),
            fill_color: None,
        }
    }

    fn position(&self) -> Option<Position> {
        self.xfrm
            .map(|(x, y, cx, cy)| Position::from_emu(x, y, cx, cy))
    }

    fn kind(&self) -> ShapeKind {
        match self.element {
            _ if self.placeholder.is_some() => ShapeKind::Placeholder,
            Element::Shape if self.text_box => ShapeKind::TextBox,
            Element::Shape | Element::ContentPart => ShapeKind::AutoShape,
            Element::Picture => ShapeKind::Picture,
            Element::Group => ShapeKind::Group,
            Element::GraphicFrame => ShapeKind::GraphicFrame,
            Element::Connector => ShapeKind::Connector,
        }
    }

    fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Default)]
struct ShapeTree {
    /// `p:cSld/@name`
    name: Option<String>,
    shapes: Vec<RawShape>,
    /// `p:sldLayoutId/@r:id` entries, present on slide masters.
    layout_rids: Vec<String>,
}

/// Per-shape parse state.
#[derive(Debug, Default)]
struct ShapeState {
    /// Element depth below the top-level shape element.
    depth: usize,
    named: bool,
    in_xfrm: bool,
    xfrm_done: bool,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    in_sp_pr: bool,
    in_line: bool,
    in_fill: bool,
    in_text_body: bool,
    in_run: bool,
    in_run_props: bool,
    in_text: bool,
    run_count: usize,
}

/// Read the top-level shapes of a slide, layout or master.
fn parse_shape_tree(xml: &str) -> Result<ShapeTree> {
    let mut tree = ShapeTree::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut in_sp_tree = false;
    let mut current: Option<(RawShape, ShapeState)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if let Some((shape, state)) = current.as_mut() {
                    state.depth += 1;
                    shape_element(shape, state, local, e);
                    continue;
                }

                match local {
                    b"cSld" => tree.name = attr(e, b"name"),
                    b"spTree" => in_sp_tree = true,
                    b"sldLayoutId" => tree.layout_rids.extend(rel_id(e)),
                    _ if in_sp_tree => {
                        if let Some(element) = Element::from_local(local) {
                            current = Some((RawShape::new(element), ShapeState::default()));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if let Some((shape, state)) = current.as_mut() {
                    state.depth += 1;
                    shape_element(shape, state, local, e);
                    shape_element_end(state, local);
                    state.depth -= 1;
                    continue;
                }

                match local {
                    b"sldLayoutId" => tree.layout_rids.extend(rel_id(e)),
                    b"cSld" => tree.name = attr(e, b"name"),
                    _ if in_sp_tree => {
                        if let Some(element) = Element::from_local(local) {
                            tree.shapes.push(RawShape::new(element));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some((shape, state)) = current.as_mut() {
                    if state.in_text {
                        let text = e.unescape().unwrap_or_default();
                        if let Some(paragraph) = shape.paragraphs.last_mut() {
                            paragraph.text.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                match current.take() {
                    Some((mut shape, state)) if state.depth == 0 => {
                        if let (Some((x, y)), Some((cx, cy))) = (state.offset, state.extent) {
                            shape.xfrm = Some((x, y, cx, cy));
                        }
                        tree.shapes.push(shape);
                        continue;
                    }
                    Some((shape, mut state)) => {
                        shape_element_end(&mut state, local);
                        state.depth -= 1;
                        current = Some((shape, state));
                        continue;
                    }
                    None => {}
                }

                if local == b"spTree" {
                    in_sp_tree = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing shape tree: {}", e)));
            }
            _ => {}
        }
    }

    Ok(tree)
}

/// Handle an opening (or empty) element inside a top-level shape.
fn shape_element(shape: &mut RawShape, state: &mut ShapeState, local: &[u8], e: &BytesStart) {
    let is_group = shape.element == Element::Group;

    match local {
        b"cNvPr" if !state.named => {
            shape.name = attr(e, b"name").unwrap_or_default();
            state.named = true;
        }
        b"cNvSpPr" if !is_group => {
            shape.text_box = attr_bool(e, b"txBox").unwrap_or(false);
        }
        b"ph" if !is_group && shape.placeholder.is_none() => {
            let ph_type = PlaceholderType::from_ooxml(attr(e, b"type").as_deref());
            let idx = attr_i64(e, b"idx").and_then(|i| u32::try_from(i).ok()).unwrap_or(0);
            shape.placeholder = Some((ph_type, idx));
        }
        b"xfrm" if !state.xfrm_done => state.in_xfrm = true,
        b"off" if state.in_xfrm => {
            if let (Some(x), Some(y)) = (attr_i64(e, b"x"), attr_i64(e, b"y")) {
                state.offset = Some((x, y));
            }
        }
        b"ext" if state.in_xfrm => {
            if let (Some(cx), Some(cy)) = (attr_i64(e, b"cx"), attr_i64(e, b"cy")) {
                state.extent = Some((cx, cy));
            }
        }
        b"spPr" if !is_group && state.depth == 1 => state.in_sp_pr = true,
        b"ln" if state.in_sp_pr => state.in_line = true,
        b"solidFill" if state.in_sp_pr && !state.in_line => state.in_fill = true,
        b"txBody" if !is_group && state.depth == 1 => {
            shape.has_text_body = true;
            state.in_text_body = true;
        }
        b"p" if state.in_text_body => {
            shape.paragraphs.push(RawParagraph::default());
            state.run_count = 0;
        }
        b"r" if state.in_text_body => {
            state.in_run = true;
            state.run_count += 1;
        }
        b"br" if state.in_text_body => {
            if let Some(paragraph) = shape.paragraphs.last_mut() {
                paragraph.text.push('\n');
            }
        }
        b"rPr" if state.in_run && state.run_count == 1 => {
            state.in_run_props = true;
            if let Some(paragraph) = shape.paragraphs.last_mut() {
                paragraph.first_run = Some(RunStyle {
                    size_emu: attr_i64(e, b"sz").map(centipoints_to_emu),
                    bold: attr_bool(e, b"b"),
                    color: None,
                });
            }
        }
        b"srgbClr" if state.in_run_props => {
            let color = attr(e, b"val");
            if let Some(style) = shape
                .paragraphs
                .last_mut()
                .and_then(|p| p.first_run.as_mut())
            {
                style.color = color;
            }
        }
        b"srgbClr" if state.in_fill && shape.fill_color.is_none() => {
            shape.fill_color = attr(e, b"val");
        }
        b"t" if state.in_text_body => state.in_text = true,
        _ => {}
    }
}

/// Handle the close of an element inside a top-level shape.
fn shape_element_end(state: &mut ShapeState, local: &[u8]) {
    match local {
        b"xfrm" if state.in_xfrm => {
            state.in_xfrm = false;
            state.xfrm_done = true;
        }
        b"spPr" => state.in_sp_pr = false,
        b"ln" => state.in_line = false,
        b"solidFill" => state.in_fill = false,
        b"txBody" => state.in_text_body = false,
        b"r" => state.in_run = false,
        b"rPr" => state.in_run_props = false,
        b"t" => state.in_text = false,
        _ => {}
    }
}

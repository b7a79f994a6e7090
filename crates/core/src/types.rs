//! Domain types for template metadata and sampled slide content.

use crate::classify::SlideLabel;
use crate::units;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Structural metadata extracted from a presentation template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Stable id derived from the template file name.
    pub template_id: String,

    /// File name of the template.
    pub template_name: String,

    /// Path the template was analyzed from.
    pub template_path: String,

    /// Slide width in inches.
    pub slide_width: f64,

    /// Slide height in inches.
    pub slide_height: f64,

    /// Number of content slides in the template.
    pub total_slides: usize,

    /// Layouts in source order.
    pub layouts: Vec<LayoutRecord>,

    /// Heuristic labels for the first few template slides.
    pub available_slide_types: Vec<SlideTypeSample>,
}

impl TemplateMetadata {
    /// Read metadata back from a JSON document.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Number of layouts in the template.
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Find a layout by its 0-based index.
    pub fn layout(&self, index: usize) -> Option<&LayoutRecord> {
        self.layouts.iter().find(|l| l.layout_index == index)
    }
}

/// A single slide layout and its named placeholder slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Sequential id, `layout_<n>`.
    pub layout_id: String,

    /// 0-based position in the source layout collection.
    pub layout_index: usize,

    /// Human-readable layout name.
    pub layout_name: String,

    /// Placeholder slots keyed by shape name.
    pub slots: BTreeMap<String, SlotRecord>,

    /// Count of all top-level shapes on the layout, not just placeholders.
    pub total_shapes: usize,
}

impl LayoutRecord {
    /// Create an empty layout record for the given position.
    pub fn new(layout_index: usize, layout_name: impl Into<String>) -> Self {
        Self {
            layout_id: format!("layout_{}", layout_index),
            layout_index,
            layout_name: layout_name.into(),
            slots: BTreeMap::new(),
            total_shapes: 0,
        }
    }

    /// Insert a slot keyed by its name.
    ///
    /// A later slot with the same name replaces the earlier one. Returns the
    /// replaced slot, if any.
    pub fn insert_slot(&mut self, slot: SlotRecord) -> Option<SlotRecord> {
        self.slots.insert(slot.name.clone(), slot)
    }

    /// The first slot of the given placeholder type.
    pub fn slot_of_type(&self, placeholder_type: PlaceholderType) -> Option<&SlotRecord> {
        self.slots
            .values()
            .find(|s| s.placeholder_type == placeholder_type)
    }
}

/// A placeholder slot within a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Placeholder category.
    pub placeholder_type: PlaceholderType,

    /// Positional index from the source.
    pub placeholder_idx: u32,

    /// Shape name.
    pub name: String,

    /// Position and size in inches, rounded to 2 decimals.
    pub position: Position,

    /// Whether the shape carries a text body.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_text_frame: bool,
}

/// Position and size of a shape in inches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    /// Build a stored position from raw EMU values.
    pub fn from_emu(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self {
            left: units::emu_to_stored_inches(x),
            top: units::emu_to_stored_inches(y),
            width: units::emu_to_stored_inches(cx),
            height: units::emu_to_stored_inches(cy),
        }
    }
}

/// Placeholder categories defined by PresentationML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderType {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    SlideImage,
    Picture,
    Date,
    Footer,
    SlideNumber,
    Header,
}

impl PlaceholderType {
    /// Parse the `type` attribute of a `p:ph` element.
    ///
    /// An absent attribute means `obj`. Unknown values are treated the same way.
    pub fn from_ooxml(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => Self::Title,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "clipArt" => Self::ClipArt,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "sldImg" => Self::SlideImage,
            "pic" => Self::Picture,
            "dt" => Self::Date,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "hdr" => Self::Header,
            _ => Self::Object,
        }
    }

    /// The `type` attribute value written for this placeholder.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Object => "obj",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::ClipArt => "clipArt",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::SlideImage => "sldImg",
            Self::Picture => "pic",
            Self::Date => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Header => "hdr",
        }
    }

    /// Whether this is a slide title.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Whether this placeholder is chrome that is not copied onto new slides.
    pub fn is_chrome(&self) -> bool {
        matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }

    /// The master placeholder type a layout placeholder inherits geometry from.
    pub fn master_base(&self) -> Self {
        match self {
            Self::Title | Self::CenterTitle => Self::Title,
            Self::Date => Self::Date,
            Self::Footer => Self::Footer,
            Self::SlideNumber => Self::SlideNumber,
            Self::Header => Self::Header,
            _ => Self::Body,
        }
    }
}

/// Heuristic label for one sampled template slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideTypeSample {
    /// 0-based index of the sampled slide.
    pub sample_slide_index: usize,

    /// Coarse content label.
    pub description: SlideLabel,

    /// Count of top-level shapes on the slide.
    pub shape_count: usize,
}

/// Shapes read from one existing slide, used for classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSample {
    /// 0-based slide index in presentation order.
    pub index: usize,

    /// Top-level shapes in tree order.
    pub shapes: Vec<ShapeSample>,
}

impl SlideSample {
    /// Create an empty sample for the given slide index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            shapes: Vec::new(),
        }
    }

    /// Shapes that carry non-blank text.
    pub fn text_shapes(&self) -> impl Iterator<Item = &ShapeSample> {
        self.shapes.iter().filter(|s| s.has_text())
    }
}

/// A top-level shape on a sampled slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeSample {
    /// Shape name (`p:cNvPr/@name`).
    pub name: String,

    /// Kind of shape element.
    pub kind: ShapeKind,

    /// Position and size in inches.
    pub position: Position,

    /// Text content, paragraphs joined by `\n`.
    pub text: String,

    /// Style of the first run of the first paragraph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_run: Option<RunStyle>,

    /// Solid fill colour as `RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
}

impl ShapeSample {
    /// Whether the shape has non-blank text.
    pub fn has_text(&self) -> bool {
        self.kind.can_hold_text() && !self.text.trim().is_empty()
    }
}

/// The kind of element a shape was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    AutoShape,
    TextBox,
    Placeholder,
    Picture,
    Group,
    GraphicFrame,
    Connector,
}

impl ShapeKind {
    /// Whether shapes of this kind expose text directly.
    pub fn can_hold_text(&self) -> bool {
        matches!(self, Self::AutoShape | Self::TextBox | Self::Placeholder)
    }
}

/// Character properties of a text run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Font size in EMU, when set explicitly on the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_emu: Option<i64>,

    /// Explicit bold flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Solid text colour as `RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

//! Template descriptors.
//!
//! A descriptor is the declarative form of a template's slide-building
//! procedures: the five archetypes, their parameters, preferred layouts and
//! fixed regions, together with a full copy of the template metadata. A
//! builder consumes it at runtime instead of generated source code.
//!
//! Region geometry is template-agnostic. The extracted slot positions travel
//! in `metadata` for introspection only.

use crate::error::{Error, Result};
use crate::naming;
use crate::types::{Position, TemplateMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Name recorded in `generated_by`.
pub const GENERATOR: &str = concat!("deckgen ", env!("CARGO_PKG_VERSION"));

/// Bookkeeping operations every builder exposes besides the archetypes.
pub const OPERATIONS: &[&str] = &["save", "get_slide_count"];

/// A fixed slide archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Title,
    Content,
    SectionHeader,
    ImagePlaceholder,
    TwoColumn,
}

impl Archetype {
    /// All archetypes in emission order.
    pub const ALL: [Archetype; 5] = [
        Archetype::Title,
        Archetype::Content,
        Archetype::SectionHeader,
        Archetype::ImagePlaceholder,
        Archetype::TwoColumn,
    ];

    /// Name of the procedure that builds this archetype.
    pub fn procedure_name(&self) -> &'static str {
        match self {
            Self::Title => "add_title_slide",
            Self::Content => "add_content_slide",
            Self::SectionHeader => "add_section_header_slide",
            Self::ImagePlaceholder => "add_image_placeholder_slide",
            Self::TwoColumn => "add_two_column_slide",
        }
    }

    /// Layout index tried first; clamped to the last layout at build time.
    pub fn preferred_layout(&self) -> usize {
        match self {
            Self::Title | Self::TwoColumn => 0,
            Self::Content => 1,
            Self::SectionHeader => 2,
            Self::ImagePlaceholder => 5,
        }
    }

    /// Regions a descriptor must define for this archetype.
    pub fn required_regions(&self) -> &'static [RegionRole] {
        match self {
            Self::Title => &[RegionRole::Title, RegionRole::Subtitle],
            Self::Content => &[RegionRole::Title, RegionRole::Body],
            Self::SectionHeader => &[],
            Self::ImagePlaceholder => &[
                RegionRole::Title,
                RegionRole::Panel,
                RegionRole::PanelHeader,
                RegionRole::PanelPrompt,
                RegionRole::PanelContext,
            ],
            Self::TwoColumn => &[
                RegionRole::Title,
                RegionRole::LeftColumn,
                RegionRole::RightColumn,
            ],
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Title => "Centered title with an optional subtitle",
            Self::Content => "Title with a single-level bullet list",
            Self::SectionHeader => "Section header using the layout's own title placeholder",
            Self::ImagePlaceholder => "Styled panel standing in for an image, showing its prompt",
            Self::TwoColumn => "Title with two side-by-side text columns",
        }
    }

    fn params(&self) -> Vec<ParamSpec> {
        match self {
            Self::Title => vec![
                ParamSpec::text("title"),
                ParamSpec::text("subtitle").optional(),
            ],
            Self::Content => vec![ParamSpec::text("title"), ParamSpec::list("bullets")],
            Self::SectionHeader => vec![ParamSpec::text("title")],
            Self::ImagePlaceholder => vec![
                ParamSpec::text("title"),
                ParamSpec::text("image_prompt"),
                ParamSpec::text("context").optional(),
            ],
            Self::TwoColumn => vec![
                ParamSpec::text("title"),
                ParamSpec::list("left_content"),
                ParamSpec::list("right_content"),
            ],
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.procedure_name())
    }
}

/// The role a region plays within an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionRole {
    Title,
    Subtitle,
    Body,
    Panel,
    PanelHeader,
    PanelPrompt,
    PanelContext,
    LeftColumn,
    RightColumn,
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Character and paragraph styling for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    /// Text colour as `RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_before_pt: Option<f64>,
    #[serde(default)]
    pub word_wrap: bool,
}

impl TextStyle {
    fn sized(size_pt: f64) -> Self {
        Self {
            size_pt,
            bold: false,
            italic: false,
            align: None,
            color: None,
            space_before_pt: None,
            word_wrap: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn centered(mut self) -> Self {
        self.align = Some(Align::Center);
        self
    }

    fn wrapped(mut self) -> Self {
        self.word_wrap = true;
        self
    }

    fn color(mut self, rgb: &str) -> Self {
        self.color = Some(rgb.to_string());
        self
    }

    fn space_before(mut self, points: f64) -> Self {
        self.space_before_pt = Some(points);
        self
    }
}

/// A fixed area of an archetype slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub role: RegionRole,
    /// Frame in inches. Paragraph regions inside a panel have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Position>,
    pub style: TextStyle,
    /// Fixed text shown in or before the region's content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Region {
    fn framed(role: RegionRole, left: f64, top: f64, width: f64, height: f64, style: TextStyle) -> Self {
        Self {
            role,
            frame: Some(Position {
                left,
                top,
                width,
                height,
            }),
            style,
            label: None,
        }
    }

    fn paragraph(role: RegionRole, style: TextStyle) -> Self {
        Self {
            role,
            frame: None,
            style,
            label: None,
        }
    }

    fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Fill and outline of the image placeholder panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    /// Fill colour as `RRGGBB`.
    pub fill: String,
    /// Outline colour as `RRGGBB`.
    pub line: String,
    pub line_width_pt: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
}

/// Kind of value a procedure parameter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Text,
    TextList,
}

/// A procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default)]
    pub optional: bool,
}

impl ParamSpec {
    fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Text,
            optional: false,
        }
    }

    fn list(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::TextList,
            optional: false,
        }
    }

    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Declarative form of one archetype procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeSpec {
    pub archetype: Archetype,
    pub procedure: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub preferred_layout: usize,
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel: Option<PanelStyle>,
}

impl ArchetypeSpec {
    /// The standard fixed-position spec for an archetype.
    pub fn standard(archetype: Archetype) -> Self {
        use RegionRole::*;

        let heading = || Region::framed(Title, 0.5, 0.5, 9.0, 0.8, TextStyle::sized(32.0).bold());

        let (regions, panel) = match archetype {
            Archetype::Title => (
                vec![
                    Region::framed(Title, 1.0, 2.0, 8.0, 1.0, TextStyle::sized(44.0).bold().centered()),
                    Region::framed(Subtitle, 1.0, 3.2, 8.0, 0.8, TextStyle::sized(24.0).centered()),
                ],
                None,
            ),
            Archetype::Content => (
                vec![
                    heading(),
                    Region::framed(Body, 0.5, 1.5, 9.0, 4.0, TextStyle::sized(18.0).wrapped()),
                ],
                None,
            ),
            Archetype::SectionHeader => (Vec::new(), None),
            Archetype::ImagePlaceholder => (
                vec![
                    heading(),
                    Region::framed(Panel, 1.5, 2.0, 7.0, 4.0, TextStyle::sized(11.0).wrapped()),
                    Region::paragraph(PanelHeader, TextStyle::sized(14.0).bold().color("1E3A8A"))
                        .labelled("\u{1F4F7} IMAGE PROMPT:"),
                    Region::paragraph(
                        PanelPrompt,
                        TextStyle::sized(11.0).color("000000").space_before(12.0),
                    ),
                    Region::paragraph(
                        PanelContext,
                        TextStyle::sized(10.0).italic().color("4B5563").space_before(12.0),
                    )
                    .labelled("\n\u{1F4A1} Context: "),
                ],
                Some(PanelStyle {
                    fill: "E8F4F8".to_string(),
                    line: "1E3A8A".to_string(),
                    line_width_pt: 2.0,
                    margin_left: 0.3,
                    margin_right: 0.3,
                    margin_top: 0.3,
                }),
            ),
            Archetype::TwoColumn => (
                vec![
                    heading(),
                    Region::framed(LeftColumn, 0.5, 1.5, 4.5, 4.0, TextStyle::sized(14.0).wrapped()),
                    Region::framed(RightColumn, 5.0, 1.5, 4.5, 4.0, TextStyle::sized(14.0).wrapped()),
                ],
                None,
            ),
        };

        Self {
            archetype,
            procedure: archetype.procedure_name().to_string(),
            description: archetype.description().to_string(),
            params: archetype.params(),
            preferred_layout: archetype.preferred_layout(),
            regions,
            panel,
        }
    }

    /// Find the region with the given role.
    pub fn region(&self, role: RegionRole) -> Option<&Region> {
        self.regions.iter().find(|r| r.role == role)
    }

    /// Layout index to use for a template with `layout_count` layouts.
    pub fn layout_for(&self, layout_count: usize) -> usize {
        self.preferred_layout.min(layout_count.saturating_sub(1))
    }

    fn validate(&self) -> Result<()> {
        for role in self.archetype.required_regions() {
            let region = self.region(*role).ok_or_else(|| {
                Error::InvalidDescriptor(format!("{} has no {:?} region", self.procedure, role))
            })?;
            let needs_frame = !matches!(
                role,
                RegionRole::PanelHeader | RegionRole::PanelPrompt | RegionRole::PanelContext
            );
            if needs_frame && region.frame.is_none() {
                return Err(Error::InvalidDescriptor(format!(
                    "{} region {:?} has no frame",
                    self.procedure, role
                )));
            }
        }
        if self.archetype == Archetype::ImagePlaceholder && self.panel.is_none() {
            return Err(Error::InvalidDescriptor(format!(
                "{} has no panel style",
                self.procedure
            )));
        }
        Ok(())
    }
}

/// The emitted set of slide-building procedures for one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Builder type name, e.g. `QuarterlyReviewTemplate`.
    pub type_name: String,
    pub template_id: String,
    pub template_name: String,
    /// Donor deck loaded fresh by every builder.
    pub template_path: String,
    pub generated_by: String,
    pub archetypes: Vec<ArchetypeSpec>,
    pub operations: Vec<String>,
    /// Verbatim copy of the analyzed metadata.
    pub metadata: TemplateMetadata,
}

impl TemplateDescriptor {
    /// Build the standard descriptor for analyzed metadata.
    pub fn from_metadata(metadata: TemplateMetadata) -> Self {
        Self {
            type_name: naming::derive_type_name(&metadata.template_id),
            template_id: metadata.template_id.clone(),
            template_name: metadata.template_name.clone(),
            template_path: metadata.template_path.clone(),
            generated_by: GENERATOR.to_string(),
            archetypes: Archetype::ALL.iter().map(|a| ArchetypeSpec::standard(*a)).collect(),
            operations: OPERATIONS.iter().map(|s| s.to_string()).collect(),
            metadata,
        }
    }

    /// Read a descriptor from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let descriptor: Self = serde_json::from_str(&raw)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// The spec for an archetype.
    pub fn archetype(&self, archetype: Archetype) -> Option<&ArchetypeSpec> {
        self.archetypes.iter().find(|a| a.archetype == archetype)
    }

    /// Names of all procedures and operations, archetypes first.
    pub fn procedure_names(&self) -> Vec<&str> {
        self.archetypes
            .iter()
            .map(|a| a.procedure.as_str())
            .chain(self.operations.iter().map(String::as_str))
            .collect()
    }

    /// Check that every archetype is present exactly once and complete.
    pub fn validate(&self) -> Result<()> {
        for archetype in Archetype::ALL {
            let count = self
                .archetypes
                .iter()
                .filter(|a| a.archetype == archetype)
                .count();
            if count != 1 {
                return Err(Error::InvalidDescriptor(format!(
                    "expected exactly one {} procedure, found {}",
                    archetype, count
                )));
            }
        }
        for spec in &self.archetypes {
            spec.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(template_id: &str) -> TemplateMetadata {
        TemplateMetadata {
            template_id: template_id.to_string(),
            template_name: "Quarterly-Review.pptx".to_string(),
            template_path: "decks/Quarterly-Review.pptx".to_string(),
            slide_width: 10.0,
            slide_height: 7.5,
            total_slides: 0,
            layouts: Vec::new(),
            available_slide_types: Vec::new(),
        }
    }

    #[test]
    fn test_descriptor_has_five_archetypes_and_operations() {
        let descriptor = TemplateDescriptor::from_metadata(metadata("quarterly_review"));

        assert_eq!(descriptor.type_name, "QuarterlyReviewTemplate");
        assert_eq!(descriptor.archetypes.len(), 5);
        assert_eq!(
            descriptor.procedure_names(),
            vec![
                "add_title_slide",
                "add_content_slide",
                "add_section_header_slide",
                "add_image_placeholder_slide",
                "add_two_column_slide",
                "save",
                "get_slide_count",
            ]
        );
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_layout_choice_is_clamped() {
        let content = ArchetypeSpec::standard(Archetype::Content);
        assert_eq!(content.layout_for(11), 1);
        assert_eq!(content.layout_for(1), 0);

        let section = ArchetypeSpec::standard(Archetype::SectionHeader);
        assert_eq!(section.layout_for(2), 1);

        let image = ArchetypeSpec::standard(Archetype::ImagePlaceholder);
        assert_eq!(image.layout_for(11), 5);
        assert_eq!(image.layout_for(0), 0);
    }

    #[test]
    fn test_standard_title_geometry() {
        let spec = ArchetypeSpec::standard(Archetype::Title);
        let title = spec.region(RegionRole::Title).unwrap();
        assert_eq!(title.style.size_pt, 44.0);
        assert!(title.style.bold);
        assert_eq!(title.style.align, Some(Align::Center));
        assert_eq!(title.frame.unwrap().top, 2.0);

        let subtitle = spec.region(RegionRole::Subtitle).unwrap();
        assert_eq!(subtitle.style.size_pt, 24.0);
        assert!(!subtitle.style.bold);
    }

    #[test]
    fn test_metadata_is_embedded_verbatim() {
        let meta = metadata("deck");
        let descriptor = TemplateDescriptor::from_metadata(meta.clone());
        assert_eq!(descriptor.metadata, meta);
    }

    #[test]
    fn test_validate_rejects_missing_region() {
        let mut descriptor = TemplateDescriptor::from_metadata(metadata("deck"));
        descriptor.archetypes[1].regions.retain(|r| r.role != RegionRole::Body);

        let err = descriptor.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_validate_rejects_duplicate_archetype() {
        let mut descriptor = TemplateDescriptor::from_metadata(metadata("deck"));
        descriptor
            .archetypes
            .push(ArchetypeSpec::standard(Archetype::Title));
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = TemplateDescriptor::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

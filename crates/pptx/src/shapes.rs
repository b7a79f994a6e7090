//! Shapes placed on generated slides and their PresentationML serialization.

use crate::xml::escape;
use deckgen_core::descriptor::{Align, PanelStyle, TextStyle};
use deckgen_core::units::{inches_to_emu, points_to_emu};
use deckgen_core::{PlaceholderType, Position};
use std::fmt::Write as FmtWrite;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

/// A run of text with optional character styling.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub style: Option<TextStyle>,
}

/// A paragraph of runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Option<Align>,
    pub space_before_pt: Option<f64>,
}

impl Paragraph {
    /// A paragraph holding one unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run {
                text: text.into(),
                style: None,
            }],
            ..Default::default()
        }
    }

    /// A paragraph holding one run in `style`, taking alignment and spacing
    /// from the style too.
    pub fn styled(text: impl Into<String>, style: &TextStyle) -> Self {
        Self {
            runs: vec![Run {
                text: text.into(),
                style: Some(style.clone()),
            }],
            align: style.align,
            space_before_pt: style.space_before_pt,
        }
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Inner margins of a text body, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
}

/// A text frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBody {
    pub paragraphs: Vec<Paragraph>,
    pub word_wrap: bool,
    pub insets: Option<Insets>,
}

impl TextBody {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Default::default()
        }
    }

    pub fn wrapped(mut self, word_wrap: bool) -> Self {
        self.word_wrap = word_wrap;
        self
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = Some(insets);
        self
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A shape on a generated slide.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideShape {
    /// A placeholder cloned from the slide's layout; geometry is inherited.
    Placeholder {
        name: String,
        ph_type: PlaceholderType,
        idx: u32,
        body: Option<TextBody>,
    },
    TextBox {
        name: String,
        frame: Position,
        body: TextBody,
    },
    /// A filled and outlined rectangle with text.
    Rectangle {
        name: String,
        frame: Position,
        panel: PanelStyle,
        body: TextBody,
    },
}

impl SlideShape {
    /// Empty placeholder of the given type, with an empty text frame for the
    /// types that carry one.
    pub fn placeholder(name: impl Into<String>, ph_type: PlaceholderType, idx: u32) -> Self {
        let body = placeholder_has_text_frame(ph_type).then(|| TextBody::new(Vec::new()));
        Self::Placeholder {
            name: name.into(),
            ph_type,
            idx,
            body,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Placeholder { name, .. }
            | Self::TextBox { name, .. }
            | Self::Rectangle { name, .. } => name,
        }
    }

    pub fn body(&self) -> Option<&TextBody> {
        match self {
            Self::Placeholder { body, .. } => body.as_ref(),
            Self::TextBox { body, .. } | Self::Rectangle { body, .. } => Some(body),
        }
    }

    /// Write the shape as a `p:sp` element with the given shape id.
    pub fn write_xml(&self, xml: &mut String, id: u32) {
        xml.push_str("<p:sp><p:nvSpPr>");
        let _ = write!(
            xml,
            r#"<p:cNvPr id="{}" name="{}"/>"#,
            id,
            escape(self.name())
        );

        match self {
            Self::Placeholder {
                ph_type, idx, body, ..
            } => {
                xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph"#);
                if *ph_type != PlaceholderType::Object {
                    let _ = write!(xml, r#" type="{}""#, ph_type.as_ooxml());
                }
                if *idx != 0 {
                    let _ = write!(xml, r#" idx="{}""#, idx);
                }
                xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");
                if let Some(body) = body {
                    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
                    write_paragraphs(xml, &body.paragraphs);
                    xml.push_str("</p:txBody>");
                }
            }
            Self::TextBox { frame, body, .. } => {
                xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#);
                write_xfrm(xml, frame);
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
                write_text_body(xml, body, true);
            }
            Self::Rectangle {
                frame, panel, body, ..
            } => {
                xml.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>");
                write_xfrm(xml, frame);
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                let _ = write!(
                    xml,
                    r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                    escape(&panel.fill)
                );
                let _ = write!(
                    xml,
                    r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln></p:spPr>"#,
                    points_to_emu(panel.line_width_pt),
                    escape(&panel.line)
                );
                write_text_body(xml, body, false);
            }
        }

        xml.push_str("</p:sp>");
    }
}

/// Placeholder types whose fresh clones get an empty text frame.
pub fn placeholder_has_text_frame(ph_type: PlaceholderType) -> bool {
    matches!(
        ph_type,
        PlaceholderType::Title
            | PlaceholderType::CenterTitle
            | PlaceholderType::Subtitle
            | PlaceholderType::Body
            | PlaceholderType::Object
    )
}

/// Serialize a complete slide part for `shapes`.
pub fn slide_xml(shapes: &[SlideShape]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    let _ = write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    );
    xml.push_str(
        r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    );
    xml.push_str(
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    );

    // id 1 is the shape tree itself
    for (shape, id) in shapes.iter().zip(2u32..) {
        shape.write_xml(&mut xml, id);
    }

    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

fn write_xfrm(xml: &mut String, frame: &Position) {
    let _ = write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        inches_to_emu(frame.left),
        inches_to_emu(frame.top),
        inches_to_emu(frame.width),
        inches_to_emu(frame.height)
    );
}

fn write_text_body(xml: &mut String, body: &TextBody, auto_fit: bool) {
    xml.push_str("<p:txBody><a:bodyPr");
    xml.push_str(if body.word_wrap {
        r#" wrap="square""#
    } else {
        r#" wrap="none""#
    });
    if let Some(insets) = body.insets {
        let _ = write!(
            xml,
            r#" lIns="{}" tIns="{}" rIns="{}""#,
            inches_to_emu(insets.left),
            inches_to_emu(insets.top),
            inches_to_emu(insets.right)
        );
    }
    xml.push_str(r#" rtlCol="0""#);
    if auto_fit {
        xml.push_str("><a:spAutoFit/></a:bodyPr>");
    } else {
        xml.push_str("/>");
    }
    xml.push_str("<a:lstStyle/>");
    write_paragraphs(xml, &body.paragraphs);
    xml.push_str("</p:txBody>");
}

fn write_paragraphs(xml: &mut String, paragraphs: &[Paragraph]) {
    // a text body needs at least one paragraph
    if paragraphs.is_empty() {
        xml.push_str("<a:p/>");
        return;
    }
    for paragraph in paragraphs {
        write_paragraph(xml, paragraph);
    }
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    xml.push_str("<a:p>");

    if paragraph.align.is_some() || paragraph.space_before_pt.is_some() {
        xml.push_str("<a:pPr");
        if let Some(align) = paragraph.align {
            let value = match align {
                Align::Left => "l",
                Align::Center => "ctr",
                Align::Right => "r",
            };
            let _ = write!(xml, r#" algn="{}""#, value);
        }
        match paragraph.space_before_pt {
            Some(points) => {
                let _ = write!(
                    xml,
                    r#"><a:spcBef><a:spcPts val="{}"/></a:spcBef></a:pPr>"#,
                    (points * 100.0).round() as i64
                );
            }
            None => xml.push_str("/>"),
        }
    }

    for run in &paragraph.runs {
        let single_line = !run.text.contains('\n');
        for (i, line) in run.text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<a:br/>");
            }
            if single_line || !line.is_empty() {
                write_run(xml, line, run.style.as_ref());
            }
        }
    }

    xml.push_str("</a:p>");
}

fn write_run(xml: &mut String, text: &str, style: Option<&TextStyle>) {
    xml.push_str(r#"<a:r><a:rPr lang="en-US""#);
    let mut color = None;
    if let Some(style) = style {
        let _ = write!(xml, r#" sz="{}""#, (style.size_pt * 100.0).round() as i64);
        if style.bold {
            xml.push_str(r#" b="1""#);
        }
        if style.italic {
            xml.push_str(r#" i="1""#);
        }
        color = style.color.as_deref();
    }
    xml.push_str(r#" dirty="0""#);
    match color {
        Some(rgb) => {
            let _ = write!(
                xml,
                r#"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr>"#,
                escape(rgb)
            );
        }
        None => xml.push_str("/>"),
    }
    let _ = write!(xml, "<a:t>{}</a:t></a:r>", escape(text));
}

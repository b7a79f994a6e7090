//! Descriptor-driven slide builder.
//!
//! A [`TemplateBuilder`] is the runtime form of a template descriptor: it
//! opens the donor deck named by the descriptor, starts from zero slides and
//! appends one slide per archetype call.

use crate::deck::{DonorDeck, GeneratedSlide};
use crate::shapes::{Insets, Paragraph, TextBody};
use deckgen_core::descriptor::{ArchetypeSpec, Region, RegionRole};
use deckgen_core::{Archetype, Error, Position, Result, SlideRequest, TemplateDescriptor};
use std::path::{Path, PathBuf};

/// Builds decks from a template descriptor.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    descriptor: TemplateDescriptor,
    deck: DonorDeck,
}

impl TemplateBuilder {
    /// Validate a descriptor and open the donor deck at its `template_path`.
    pub fn from_descriptor(descriptor: TemplateDescriptor) -> Result<Self> {
        let template_path = PathBuf::from(&descriptor.template_path);
        Self::from_descriptor_with_template(descriptor, template_path)
    }

    /// Validate a descriptor and open the donor deck at `template_path`,
    /// which replaces the path recorded in the descriptor.
    pub fn from_descriptor_with_template(
        mut descriptor: TemplateDescriptor,
        template_path: impl AsRef<Path>,
    ) -> Result<Self> {
        descriptor.validate()?;
        let template_path = template_path.as_ref();
        let deck = DonorDeck::open(template_path)?;
        descriptor.template_path = template_path.display().to_string();
        log::debug!(
            "{} ready with {} layouts",
            descriptor.type_name,
            deck.layout_count()
        );
        Ok(Self { descriptor, deck })
    }

    /// Load a descriptor file and open its donor deck.
    pub fn from_descriptor_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_descriptor(TemplateDescriptor::load(path)?)
    }

    pub fn descriptor(&self) -> &TemplateDescriptor {
        &self.descriptor
    }

    pub fn deck(&self) -> &DonorDeck {
        &self.deck
    }

    /// Centered title and optional subtitle on the first layout.
    pub fn add_title_slide(&mut self, title: &str, subtitle: Option<&str>) -> Result<()> {
        let (spec, slide) = self.start(Archetype::Title)?;
        add_region_box(slide, spec, RegionRole::Title, &[title])?;
        if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
            add_region_box(slide, spec, RegionRole::Subtitle, &[subtitle])?;
        }
        Ok(())
    }

    /// Heading plus one paragraph per bullet.
    pub fn add_content_slide<S: AsRef<str>>(&mut self, title: &str, bullets: &[S]) -> Result<()> {
        let (spec, slide) = self.start(Archetype::Content)?;
        add_region_box(slide, spec, RegionRole::Title, &[title])?;
        add_region_box(slide, spec, RegionRole::Body, bullets)?;
        Ok(())
    }

    /// Sets the layout's own title placeholder. Layouts without one get a
    /// slide with no title.
    pub fn add_section_header_slide(&mut self, title: &str) -> Result<()> {
        let (_, slide) = self.start(Archetype::SectionHeader)?;
        if !slide.set_title_placeholder(TextBody::new(vec![Paragraph::plain(title)])) {
            log::debug!(
                "Layout {} has no title placeholder; section title dropped",
                slide.layout_index
            );
        }
        Ok(())
    }

    /// Heading plus a styled panel showing the image prompt and optional context.
    pub fn add_image_placeholder_slide(
        &mut self,
        title: &str,
        image_prompt: &str,
        context: Option<&str>,
    ) -> Result<()> {
        let (spec, slide) = self.start(Archetype::ImagePlaceholder)?;
        add_region_box(slide, spec, RegionRole::Title, &[title])?;

        let panel_region = region(spec, RegionRole::Panel)?;
        let frame = framed(spec, panel_region)?;
        let panel = spec.panel.clone().ok_or_else(|| {
            Error::InvalidDescriptor(format!("{} has no panel style", spec.procedure))
        })?;

        let header = region(spec, RegionRole::PanelHeader)?;
        let prompt = region(spec, RegionRole::PanelPrompt)?;
        let mut paragraphs = vec![
            Paragraph::styled(labelled(header, ""), &header.style),
            Paragraph::styled(labelled(prompt, image_prompt), &prompt.style),
        ];
        if let Some(context) = context.filter(|c| !c.is_empty()) {
            let line = region(spec, RegionRole::PanelContext)?;
            paragraphs.push(Paragraph::styled(labelled(line, context), &line.style));
        }

        let body = TextBody::new(paragraphs)
            .wrapped(panel_region.style.word_wrap)
            .with_insets(Insets {
                left: panel.margin_left,
                right: panel.margin_right,
                top: panel.margin_top,
            });
        slide.add_rectangle(frame, panel, body);
        Ok(())
    }

    /// Heading plus two side-by-side columns.
    pub fn add_two_column_slide<L: AsRef<str>, R: AsRef<str>>(
        &mut self,
        title: &str,
        left_content: &[L],
        right_content: &[R],
    ) -> Result<()> {
        let (spec, slide) = self.start(Archetype::TwoColumn)?;
        add_region_box(slide, spec, RegionRole::Title, &[title])?;
        add_region_box(slide, spec, RegionRole::LeftColumn, left_content)?;
        add_region_box(slide, spec, RegionRole::RightColumn, right_content)?;
        Ok(())
    }

    /// Append the slide described by a request.
    pub fn add(&mut self, request: &SlideRequest) -> Result<()> {
        match request {
            SlideRequest::Title { title, subtitle } => {
                self.add_title_slide(title, subtitle.as_deref())
            }
            SlideRequest::Content { title, bullets } => {
                self.add_content_slide(title, bullets.as_slice())
            }
            SlideRequest::SectionHeader { title } => self.add_section_header_slide(title),
            SlideRequest::ImagePlaceholder {
                title,
                image_prompt,
                context,
            } => self.add_image_placeholder_slide(title, image_prompt, context.as_deref()),
            SlideRequest::TwoColumn {
                title,
                left_content,
                right_content,
            } => self.add_two_column_slide(title, left_content.as_slice(), right_content.as_slice()),
        }
    }

    /// Append every request in order. Returns the resulting slide count.
    pub fn apply(&mut self, requests: &[SlideRequest]) -> Result<usize> {
        for request in requests {
            self.add(request)?;
        }
        Ok(self.get_slide_count())
    }

    /// Write the deck and return the destination path.
    pub fn save(&self, destination: impl AsRef<Path>) -> Result<PathBuf> {
        let destination = destination.as_ref();
        self.deck.save(destination)?;
        Ok(destination.to_path_buf())
    }

    /// Number of slides added so far.
    pub fn get_slide_count(&self) -> usize {
        self.deck.slide_count()
    }

    /// Add a slide on the archetype's layout.
    fn start(&mut self, archetype: Archetype) -> Result<(&ArchetypeSpec, &mut GeneratedSlide)> {
        let spec = self.descriptor.archetype(archetype).ok_or_else(|| {
            Error::InvalidDescriptor(format!("descriptor has no {} procedure", archetype))
        })?;
        let layout = spec.layout_for(self.deck.layout_count());
        let slide = self.deck.add_slide(layout)?;
        log::debug!("{} on layout {}", spec.procedure, layout);
        Ok((spec, slide))
    }
}

fn region(spec: &ArchetypeSpec, role: RegionRole) -> Result<&Region> {
    spec.region(role).ok_or_else(|| {
        Error::InvalidDescriptor(format!("{} has no {:?} region", spec.procedure, role))
    })
}

fn framed(spec: &ArchetypeSpec, region: &Region) -> Result<Position> {
    region.frame.ok_or_else(|| {
        Error::InvalidDescriptor(format!(
            "{} region {:?} has no frame",
            spec.procedure, region.role
        ))
    })
}

fn labelled(region: &Region, text: &str) -> String {
    match &region.label {
        Some(label) => format!("{}{}", label, text),
        None => text.to_string(),
    }
}

/// Add a text box for a framed region with one styled paragraph per line.
fn add_region_box<S: AsRef<str>>(
    slide: &mut GeneratedSlide,
    spec: &ArchetypeSpec,
    role: RegionRole,
    lines: &[S],
) -> Result<()> {
    let region = region(spec, role)?;
    let frame = framed(spec, region)?;
    let paragraphs = lines
        .iter()
        .map(|line| Paragraph::styled(line.as_ref(), &region.style))
        .collect();
    slide.add_text_box(frame, TextBody::new(paragraphs).wrapped(region.style.word_wrap));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::assemble;
    use crate::fixture::{self, Fixture};
    use crate::parser::PptxParser;
    use crate::shapes::SlideShape;
    use deckgen_core::ShapeKind;

    fn builder_for(fixture: Fixture, dir: &Path) -> TemplateBuilder {
        let path = dir.join("Brand-Deck.pptx");
        fixture.write(&path);
        let descriptor = TemplateDescriptor::from_metadata(assemble(&path).unwrap());
        TemplateBuilder::from_descriptor(descriptor).unwrap()
    }

    #[test]
    fn test_fresh_builder_has_no_slides() {
        let dir = tempfile::tempdir().unwrap();
        let builder = builder_for(fixture::standard_template(), dir.path());

        assert_eq!(builder.descriptor().type_name, "BrandDeckTemplate");
        assert_eq!(builder.get_slide_count(), 0);
    }

    #[test]
    fn test_each_call_appends_one_slide() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder_for(fixture::standard_template(), dir.path());

        builder.add_title_slide("Launch", Some("2025")).unwrap();
        builder.add_content_slide("Goals", &["Grow", "Retain"]).unwrap();
        builder.add_content_slide("Goals", &["Grow", "Retain"]).unwrap();
        builder.add_section_header_slide("Part Two").unwrap();
        builder
            .add_image_placeholder_slide("Vision", "A city at dawn", Some("Opening image"))
            .unwrap();
        builder
            .add_two_column_slide("Compare", &["Old"], &["New", "Faster"])
            .unwrap();

        assert_eq!(builder.get_slide_count(), 6);
        let layouts: Vec<_> = builder.deck().slides().iter().map(|s| s.layout_index).collect();
        assert_eq!(layouts, vec![0, 1, 1, 2, 5, 0]);
    }

    #[test]
    fn test_title_slide_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder_for(fixture::standard_template(), dir.path());
        builder.add_title_slide("Launch", None).unwrap();
        builder.add_title_slide("Launch", Some("Subtitle")).unwrap();

        let slides = builder.deck().slides();
        let boxes = |i: usize| {
            slides[i]
                .shapes
                .iter()
                .filter(|s| matches!(s, SlideShape::TextBox { .. }))
                .count()
        };
        assert_eq!(boxes(0), 1);
        assert_eq!(boxes(1), 2);

        let SlideShape::TextBox { frame, body, .. } = &slides[1].shapes[2] else {
            panic!("expected a text box");
        };
        assert_eq!(frame.left, 1.0);
        assert_eq!(body.text(), "Launch");
        let style = body.paragraphs[0].runs[0].style.as_ref().unwrap();
        assert_eq!(style.size_pt, 44.0);
        assert!(style.bold);
    }

    #[test]
    fn test_section_header_without_title_placeholder_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new().layout("Blank", &[]);
        let mut builder = builder_for(fixture, dir.path());

        builder.add_section_header_slide("Ignored").unwrap();

        assert_eq!(builder.get_slide_count(), 1);
        assert!(builder.deck().slides()[0].shapes.is_empty());
    }

    #[test]
    fn test_section_header_sets_native_title() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder_for(fixture::standard_template(), dir.path());
        builder.add_section_header_slide("Results").unwrap();

        let slide = &builder.deck().slides()[0];
        assert_eq!(slide.shapes.len(), 2);
        assert_eq!(slide.shapes[0].body().map(TextBody::text).as_deref(), Some("Results"));
    }

    #[test]
    fn test_image_panel_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder_for(fixture::standard_template(), dir.path());
        builder
            .add_image_placeholder_slide("Vision", "A city at dawn", None)
            .unwrap();
        builder
            .add_image_placeholder_slide("Vision", "A city at dawn", Some("Sets the tone"))
            .unwrap();

        let panel_text = |i: usize| {
            builder.deck().slides()[i]
                .shapes
                .iter()
                .find_map(|s| match s {
                    SlideShape::Rectangle { body, .. } => Some(body.text()),
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(panel_text(0), "\u{1F4F7} IMAGE PROMPT:\nA city at dawn");
        assert_eq!(
            panel_text(1),
            "\u{1F4F7} IMAGE PROMPT:\nA city at dawn\n\n\u{1F4A1} Context: Sets the tone"
        );

        // the context line opens with a break inside its own paragraph
        let mut xml = String::new();
        builder.deck().slides()[1].shapes.last().unwrap().write_xml(&mut xml, 3);
        assert!(xml.contains("</a:pPr><a:br/><a:r>"));
        assert!(xml.contains("Context: Sets the tone</a:t>"));
    }

    #[test]
    fn test_single_layout_template_clamps_layout_choice() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Fixture::new().layout(
            "Only",
            &[fixture::placeholder_sp(2, "Title 1", Some("title"), None, None)],
        );
        let mut builder = builder_for(fixture, dir.path());

        builder.add_content_slide("A", &["b"]).unwrap();
        builder.add_image_placeholder_slide("A", "b", None).unwrap();
        builder.add_section_header_slide("A").unwrap();

        assert!(builder.deck().slides().iter().all(|s| s.layout_index == 0));
    }

    #[test]
    fn test_zero_layouts_fail_on_first_add() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder_for(Fixture::new(), dir.path());

        assert_eq!(builder.get_slide_count(), 0);
        let err = builder.add_title_slide("x", None).unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate(_)));
    }

    #[test]
    fn test_apply_script_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder_for(fixture::standard_template(), dir.path());
        let script: Vec<SlideRequest> = serde_json::from_str(
            r#"[
                {"kind": "title", "title": "Launch"},
                {"kind": "content", "title": "Goals", "bullets": ["Grow", "Retain"]},
                {"kind": "two_column", "title": "Compare", "left_content": ["a"], "right_content": ["b"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(builder.apply(&script).unwrap(), 3);

        let dest = dir.path().join("out/generated.pptx");
        let written = builder.save(&dest).unwrap();
        assert_eq!(written, dest);

        let parsed = PptxParser::new().parse_file(&dest).unwrap();
        assert_eq!(parsed.slides.len(), 3);
        let bullets = parsed.slides[1]
            .shapes
            .iter()
            .find(|s| s.kind == ShapeKind::TextBox && s.text.contains("Grow"))
            .unwrap();
        assert_eq!(bullets.text, "Grow\nRetain");
        assert_eq!(bullets.position.top, 1.5);

        // still usable after saving
        builder.add_section_header_slide("More").unwrap();
        assert_eq!(builder.get_slide_count(), 4);
    }

    #[test]
    fn test_missing_donor_deck() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.pptx");
        fixture::standard_template().write(&path);
        let descriptor = TemplateDescriptor::from_metadata(assemble(&path).unwrap());
        std::fs::remove_file(&path).unwrap();

        let err = TemplateBuilder::from_descriptor(descriptor).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_relocated_template_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fixture::standard_template().write(&path);
        let descriptor = TemplateDescriptor::from_metadata(assemble(&path).unwrap());

        let moved = dir.path().join("shared").join("deck.pptx");
        std::fs::create_dir_all(moved.parent().unwrap()).unwrap();
        std::fs::rename(&path, &moved).unwrap();
        assert!(matches!(
            TemplateBuilder::from_descriptor(descriptor.clone()),
            Err(Error::NotFound(_))
        ));

        let mut builder = TemplateBuilder::from_descriptor_with_template(descriptor, &moved).unwrap();
        assert_eq!(builder.get_slide_count(), 0);
        assert_eq!(builder.descriptor().template_path, moved.display().to_string());

        builder.add_title_slide("Moved", None).unwrap();
        assert_eq!(builder.get_slide_count(), 1);
    }

    #[test]
    fn test_from_generated_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fixture::standard_template().write(&path);
        let analyzer = crate::TemplateAnalyzer::with_options(
            crate::AnalyzerOptions::default().with_output_dir(dir.path().join("out")),
        );
        let (_, written) = analyzer.generate(&path).unwrap();

        let builder = TemplateBuilder::from_descriptor_file(&written.functions_path).unwrap();
        assert_eq!(builder.descriptor().template_id, "deck");
        assert_eq!(builder.deck().layout_count(), 7);
    }

    #[test]
    fn test_incomplete_descriptor_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fixture::standard_template().write(&path);
        let mut descriptor = TemplateDescriptor::from_metadata(assemble(&path).unwrap());
        descriptor.archetypes.retain(|a| a.archetype != Archetype::TwoColumn);

        let err = TemplateBuilder::from_descriptor(descriptor).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }
}

//! Heuristic slide classification.
//!
//! A coarse best-effort labelling based on font size, shape count and a few
//! keywords. Only a bounded sample of slides is ever classified.

use crate::types::{SlideSample, SlideTypeSample};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run font size above which a text shape counts as a heading, in EMU (~31.5pt).
pub const LARGE_FONT_EMU: i64 = 400_000;

/// Number of leading slides classified by default.
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Keywords that mark a large heading as a deck title.
const TITLE_KEYWORDS: &[&str] = &["title", "presentation"];

/// Texts that mark a numbered section divider.
const SECTION_NUMBERS: &[&str] = &["01", "02", "03", "04", "05", "06", "07", "08", "09", "10"];

/// Minimum number of text shapes for a multi-paragraph content slide.
const MULTI_PARAGRAPH_SHAPES: usize = 3;

/// Coarse content label for a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideLabel {
    #[serde(rename = "Background/Design slide")]
    BackgroundDesign,
    #[serde(rename = "Title slide")]
    Title,
    #[serde(rename = "Section header slide")]
    SectionHeader,
    #[serde(rename = "Section divider slide")]
    SectionDivider,
    #[serde(rename = "Content slide (multi-paragraph)")]
    ContentMultiParagraph,
    #[serde(rename = "Content slide")]
    Content,
}

impl SlideLabel {
    /// The human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BackgroundDesign => "Background/Design slide",
            Self::Title => "Title slide",
            Self::SectionHeader => "Section header slide",
            Self::SectionDivider => "Section divider slide",
            Self::ContentMultiParagraph => "Content slide (multi-paragraph)",
            Self::Content => "Content slide",
        }
    }
}

impl fmt::Display for SlideLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a slide. Rules are evaluated in order and the first match wins.
pub fn classify(slide: &SlideSample) -> SlideLabel {
    let text_shapes: Vec<_> = slide.text_shapes().collect();

    if text_shapes.is_empty() {
        return SlideLabel::BackgroundDesign;
    }

    for shape in &text_shapes {
        let size = shape.first_run.as_ref().and_then(|r| r.size_emu);
        if size.is_some_and(|s| s > LARGE_FONT_EMU) {
            let text = shape.text.to_lowercase();
            return if TITLE_KEYWORDS.iter().any(|k| text.contains(k)) {
                SlideLabel::Title
            } else {
                SlideLabel::SectionHeader
            };
        }
    }

    if text_shapes
        .iter()
        .any(|s| SECTION_NUMBERS.contains(&s.text.trim()))
    {
        return SlideLabel::SectionDivider;
    }

    if text_shapes.len() >= MULTI_PARAGRAPH_SHAPES {
        return SlideLabel::ContentMultiParagraph;
    }

    SlideLabel::Content
}

/// Classify at most `limit` leading slides.
pub fn classify_samples(slides: &[SlideSample], limit: usize) -> Vec<SlideTypeSample> {
    slides
        .iter()
        .take(limit)
        .enumerate()
        .map(|(idx, slide)| {
            let description = classify(slide);
            log::debug!("Slide {} classified as {}", idx, description);
            SlideTypeSample {
                sample_slide_index: idx,
                description,
                shape_count: slide.shapes.len(),
            }
        })
        .collect()
}

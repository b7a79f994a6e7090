//! The slide advisor capability and the values exchanged with it.

use deckgen_core::units::EMU_PER_POINT;
use deckgen_core::{Position, Result, ShapeKind, SlideSample};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Characters of shape text included in a description.
pub const TEXT_SAMPLE_CHARS: usize = 100;

/// Number of text samples listed in a description.
pub const TEXT_SAMPLE_COUNT: usize = 3;

/// Number of key features a classification must list.
pub const KEY_FEATURE_RANGE: RangeInclusive<usize> = 3..=5;

/// Label given to slides whose classification failed.
pub const FALLBACK_SLIDE_TYPE: &str = "generic_slide";

/// Classifies slides and writes slide-building procedures for them.
///
/// Implementations may fail on any call; callers absorb failures into
/// [`SlideAnalysis::fallback`] and [`fallback_code`].
pub trait SlideAdvisor {
    fn classify_slide(&self, slide: &SlideDescription) -> Result<SlideAnalysis>;

    fn generate_code(&self, slide: &SlideDescription, analysis: &SlideAnalysis) -> Result<String>;
}

/// Structural summary of a slide sent to the advisor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideDescription {
    pub slide_index: usize,
    pub shape_count: usize,
    /// Leading text samples, each truncated.
    pub text_samples: Vec<String>,
    pub shapes: Vec<ShapeDescription>,
}

/// One shape of a [`SlideDescription`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeDescription {
    pub kind: ShapeKind,
    #[serde(flatten)]
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size_pt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
}

impl SlideDescription {
    pub fn from_sample(slide: &SlideSample) -> Self {
        let shapes: Vec<ShapeDescription> = slide
            .shapes
            .iter()
            .map(|shape| {
                let text = shape.has_text().then(|| truncate(&shape.text));
                let run = shape.first_run.as_ref().filter(|_| text.is_some());
                ShapeDescription {
                    kind: shape.kind,
                    position: shape.position,
                    font_size_pt: run
                        .and_then(|r| r.size_emu)
                        .map(|emu| emu as f64 / EMU_PER_POINT as f64),
                    font_bold: run.and_then(|r| r.bold),
                    font_color: run.and_then(|r| r.color.clone()),
                    fill_color: shape.fill_color.clone(),
                    text,
                }
            })
            .collect();

        let text_samples = shapes
            .iter()
            .filter_map(|s| s.text.clone())
            .take(TEXT_SAMPLE_COUNT)
            .collect();

        Self {
            slide_index: slide.index,
            shape_count: slide.shapes.len(),
            text_samples,
            shapes,
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(TEXT_SAMPLE_CHARS).collect()
}

/// The advisor's reading of a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideAnalysis {
    pub slide_type: String,
    pub usage_description: String,
    pub key_features: Vec<String>,
    pub recommended_content: String,
    pub function_name: String,
}

impl SlideAnalysis {
    /// The analysis used when classification fails.
    pub fn fallback(slide: &SlideDescription) -> Self {
        Self {
            slide_type: FALLBACK_SLIDE_TYPE.to_string(),
            usage_description: format!("Slide with {} shapes", slide.shape_count),
            key_features: vec!["Custom layout".to_string()],
            recommended_content: "General content".to_string(),
            function_name: format!("add_slide_{}", slide.slide_index),
        }
    }

    /// Whether a model answer carries every required field, with
    /// [`KEY_FEATURE_RANGE`] key features.
    pub fn is_complete(&self) -> bool {
        !self.slide_type.trim().is_empty()
            && !self.function_name.trim().is_empty()
            && KEY_FEATURE_RANGE.contains(&self.key_features.len())
    }
}

/// The stub procedure used when code generation fails.
pub fn fallback_code(analysis: &SlideAnalysis) -> String {
    format!(
        "pub fn {}(builder: &mut TemplateBuilder, title: &str, content: &str) -> Result<()> {{\n    \
         // {}\n    \
         // generated body unavailable; arguments are passed through unused\n    \
         let _ = (builder, title, content);\n    \
         Ok(())\n}}\n",
        analysis.function_name, analysis.usage_description
    )
}

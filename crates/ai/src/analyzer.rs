//! Model-assisted template analysis.
//!
//! Every slide of the template (not just a sample) gets one classification
//! and one code-generation call, in deck order. A failed call never fails
//! the run: the slide gets the fallback analysis or stub procedure instead.

use crate::advisor::{fallback_code, SlideAdvisor, SlideAnalysis, SlideDescription};
use crate::config::AiConfig;
use crate::gemini::GeminiAdvisor;
use deckgen_core::naming::{derive_template_id, template_name};
use deckgen_core::synth::{write_json, DEFAULT_OUTPUT_DIR};
use deckgen_core::units::emu_to_stored_inches;
use deckgen_core::{Error, Result};
use deckgen_pptx::{ParsedTemplate, PptxParser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Persisted result of a model-assisted analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTemplateMetadata {
    pub template_id: String,
    pub template_name: String,
    pub template_path: String,
    pub slide_width: f64,
    pub slide_height: f64,
    pub total_slides: usize,
    pub powerpoint_layouts: Vec<LayoutSummary>,
    pub analyzed_slides: Vec<AnalyzedSlide>,
    /// Function name to the slide it was generated from.
    pub generated_functions: BTreeMap<String, FunctionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub layout_id: String,
    pub layout_index: usize,
    pub layout_name: String,
    pub placeholder_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedSlide {
    pub slide_index: usize,
    pub slide_type: String,
    pub usage_description: String,
    pub key_features: Vec<String>,
    pub recommended_content: String,
    pub function_name: String,
    pub shape_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub slide_index: usize,
    pub description: String,
}

/// Code generated for one slide. Kept in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub function_name: String,
    pub code: String,
    /// Whether the code is the fallback stub.
    pub fallback: bool,
}

/// Metadata plus the generated code bodies.
#[derive(Debug, Clone)]
pub struct AiAnalysis {
    pub metadata: AiTemplateMetadata,
    pub function_codes: Vec<GeneratedCode>,
}

/// Template analyzer that consults a [`SlideAdvisor`] for every slide.
pub struct AiTemplateAnalyzer<A> {
    advisor: A,
    parser: PptxParser,
    output_dir: PathBuf,
}

impl AiTemplateAnalyzer<GeminiAdvisor> {
    /// Analyzer backed by Gemini. Fails with [`Error::Configuration`] when
    /// the configuration carries no API key.
    pub fn new(config: &AiConfig) -> Result<Self> {
        Ok(Self::with_advisor(GeminiAdvisor::new(config)?))
    }
}

impl<A: SlideAdvisor> AiTemplateAnalyzer<A> {
    pub fn with_advisor(advisor: A) -> Self {
        Self {
            advisor,
            parser: PptxParser::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Analyze a template file.
    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<AiAnalysis> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let parsed = self.parser.parse_file(path)?;
        Ok(self.analyze_parsed(path, &parsed))
    }

    /// Analyze a template and write `<template_id>_metadata_ai.json`.
    pub fn analyze_and_persist(&self, path: impl AsRef<Path>) -> Result<(AiAnalysis, PathBuf)> {
        let analysis = self.analyze(path)?;
        let written = persist(&analysis.metadata, &self.output_dir)?;
        Ok((analysis, written))
    }

    /// Analyze already parsed template content.
    pub fn analyze_parsed(&self, path: &Path, parsed: &ParsedTemplate) -> AiAnalysis {
        let template_id = derive_template_id(path);
        log::info!(
            "Analyzing {} slides of '{}' with model assistance",
            parsed.slides.len(),
            template_id
        );

        let powerpoint_layouts = parsed
            .layouts
            .iter()
            .map(|layout| LayoutSummary {
                layout_id: layout.record.layout_id.clone(),
                layout_index: layout.record.layout_index,
                layout_name: layout.record.layout_name.clone(),
                placeholder_count: layout.placeholders.len(),
            })
            .collect();

        let mut analyzed_slides = Vec::with_capacity(parsed.slides.len());
        let mut generated_functions = BTreeMap::new();
        let mut function_codes = Vec::with_capacity(parsed.slides.len());

        for slide in &parsed.slides {
            let description = SlideDescription::from_sample(slide);
            log::debug!(
                "Slide {}/{}: classifying",
                slide.index + 1,
                parsed.slides.len()
            );

            let analysis = self
                .advisor
                .classify_slide(&description)
                .unwrap_or_else(|e| {
                    log::warn!("Classification failed for slide {}: {}", slide.index, e);
                    SlideAnalysis::fallback(&description)
                });

            log::debug!("Slide {}: generating {}", slide.index, analysis.function_name);
            let code = match self.advisor.generate_code(&description, &analysis) {
                Ok(code) => GeneratedCode {
                    function_name: analysis.function_name.clone(),
                    code,
                    fallback: false,
                },
                Err(e) => {
                    log::warn!("Code generation failed for slide {}: {}", slide.index, e);
                    GeneratedCode {
                        function_name: analysis.function_name.clone(),
                        code: fallback_code(&analysis),
                        fallback: true,
                    }
                }
            };

            generated_functions.insert(
                analysis.function_name.clone(),
                FunctionEntry {
                    slide_index: slide.index,
                    description: analysis.usage_description.clone(),
                },
            );
            analyzed_slides.push(AnalyzedSlide {
                slide_index: slide.index,
                slide_type: analysis.slide_type,
                usage_description: analysis.usage_description,
                key_features: analysis.key_features,
                recommended_content: analysis.recommended_content,
                function_name: analysis.function_name,
                shape_count: slide.shapes.len(),
            });
            function_codes.push(code);
        }

        let metadata = AiTemplateMetadata {
            template_id,
            template_name: template_name(path),
            template_path: path.display().to_string(),
            slide_width: emu_to_stored_inches(parsed.slide_width_emu),
            slide_height: emu_to_stored_inches(parsed.slide_height_emu),
            total_slides: parsed.slides.len(),
            powerpoint_layouts,
            analyzed_slides,
            generated_functions,
        };

        log::info!(
            "Analyzed {} slides, generated {} functions",
            metadata.analyzed_slides.len(),
            function_codes.len()
        );

        AiAnalysis {
            metadata,
            function_codes,
        }
    }
}

/// Path of the model-assisted metadata artifact for a template id.
pub fn ai_metadata_path(output_dir: &Path, template_id: &str) -> PathBuf {
    output_dir.join(format!("{}_metadata_ai.json", template_id))
}

/// Write metadata without code bodies to `<template_id>_metadata_ai.json`.
pub fn persist(metadata: &AiTemplateMetadata, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = ai_metadata_path(output_dir.as_ref(), &metadata.template_id);
    write_json(&path, metadata)?;
    log::info!("Wrote model-assisted metadata to {}", path.display());
    Ok(path)
}

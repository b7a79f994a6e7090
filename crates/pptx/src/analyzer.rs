//! Template metadata assembly and persistence.

use crate::parser::{ParsedTemplate, PptxParser};
use deckgen_core::classify::{classify_samples, DEFAULT_SAMPLE_LIMIT};
use deckgen_core::naming::{derive_template_id, template_name};
use deckgen_core::synth::{self, SynthesisOutput, DEFAULT_OUTPUT_DIR};
use deckgen_core::units::emu_to_stored_inches;
use deckgen_core::{Error, Result, TemplateMetadata};
use std::path::{Path, PathBuf};

/// Options for template analysis.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Number of leading slides to classify.
    pub sample_limit: usize,
    /// Directory receiving persisted artifacts.
    pub output_dir: PathBuf,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AnalyzerOptions {
    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

/// Builds [`TemplateMetadata`] from template files.
#[derive(Default)]
pub struct TemplateAnalyzer {
    options: AnalyzerOptions,
    parser: PptxParser,
}

impl TemplateAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AnalyzerOptions) -> Self {
        Self {
            options,
            parser: PptxParser::new(),
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Read a template and assemble its metadata.
    ///
    /// Fails with [`Error::NotFound`] before reading anything if the file
    /// does not exist.
    pub fn assemble(&self, path: impl AsRef<Path>) -> Result<TemplateMetadata> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        log::info!("Analyzing template {}", path.display());
        let parsed = self.parser.parse_file(path)?;
        Ok(self.metadata_from(path, parsed))
    }

    /// Assemble metadata and write `<template_id>_metadata.json`.
    pub fn assemble_and_persist(&self, path: impl AsRef<Path>) -> Result<(TemplateMetadata, PathBuf)> {
        let metadata = self.assemble(path)?;
        let written = synth::write_metadata(&metadata, &self.options.output_dir)?;
        Ok((metadata, written))
    }

    /// Assemble metadata and emit both the descriptor and metadata artifacts.
    pub fn generate(&self, path: impl AsRef<Path>) -> Result<(TemplateMetadata, SynthesisOutput)> {
        let metadata = self.assemble(path)?;
        let output = synth::synthesize(metadata.clone(), &self.options.output_dir)?;
        Ok((metadata, output))
    }

    fn metadata_from(&self, path: &Path, parsed: ParsedTemplate) -> TemplateMetadata {
        let available_slide_types = classify_samples(&parsed.slides, self.options.sample_limit);

        let metadata = TemplateMetadata {
            template_id: derive_template_id(path),
            template_name: template_name(path),
            template_path: path.display().to_string(),
            slide_width: emu_to_stored_inches(parsed.slide_width_emu),
            slide_height: emu_to_stored_inches(parsed.slide_height_emu),
            total_slides: parsed.slides.len(),
            layouts: parsed.layouts.into_iter().map(|l| l.record).collect(),
            available_slide_types,
        };

        log::debug!(
            "Template '{}': {} layouts, {} slides, {} classified",
            metadata.template_id,
            metadata.layouts.len(),
            metadata.total_slides,
            metadata.available_slide_types.len()
        );
        metadata
    }
}

/// Assemble metadata with default options.
pub fn assemble(path: impl AsRef<Path>) -> Result<TemplateMetadata> {
    TemplateAnalyzer::new().assemble(path)
}

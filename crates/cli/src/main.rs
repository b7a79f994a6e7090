//! CLI tool for analyzing PowerPoint templates and building decks from them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deckgen_ai::{AiConfig, AiTemplateAnalyzer};
use deckgen_core::request::load_script;
use deckgen_core::{TemplateDescriptor, DEFAULT_OUTPUT_DIR};
use deckgen_pptx::{AnalyzerOptions, TemplateAnalyzer, TemplateBuilder};
use std::path::{Path, PathBuf};

/// Characters of extracted text shown by `extract`.
const PREVIEW_CHARS: usize = 500;

/// Analyze PowerPoint templates and generate decks from them.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract template metadata and write a template descriptor
    Analyze {
        /// Input template (.pptx)
        template: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Classify every template slide with a generative model
    AnalyzeAi {
        /// Input template (.pptx)
        template: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Model name (default: gemini-2.5-flash)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Build a deck from a template descriptor and a slide script
    Build {
        /// Template descriptor (.json) written by `analyze`
        descriptor: PathBuf,

        /// Slide script (.json array of slide requests)
        script: PathBuf,

        /// Output presentation (.pptx)
        #[arg(short, long)]
        output: PathBuf,

        /// Template to build from (default: the path recorded in the descriptor)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Print the text of a PDF, DOCX or TXT document
    Extract {
        /// Input document
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match &args.command {
        Command::Analyze { template, output } => analyze(template, output),
        Command::AnalyzeAi {
            template,
            output,
            model,
        } => analyze_ai(template, output, model.as_deref()),
        Command::Build {
            descriptor,
            script,
            output,
            template,
        } => build(descriptor, script, output, template.as_deref()),
        Command::Extract { document } => extract(document),
    }
}

/// Assemble metadata and synthesize the descriptor for a template.
fn analyze(template: &Path, output: &Path) -> Result<()> {
    let analyzer =
        TemplateAnalyzer::with_options(AnalyzerOptions::default().with_output_dir(output));
    let (metadata, written) = analyzer
        .generate(template)
        .with_context(|| format!("Failed to analyze {}", template.display()))?;

    println!(
        "{} ({}): {} layouts, {} slides, {:.2}\" x {:.2}\"",
        metadata.template_name,
        metadata.template_id,
        metadata.layout_count(),
        metadata.total_slides,
        metadata.slide_width,
        metadata.slide_height
    );
    for layout in &metadata.layouts {
        let slots: Vec<&str> = layout
            .slots
            .values()
            .map(|slot| slot.placeholder_type.as_ooxml())
            .collect();
        println!(
            "  [{}] {} ({} shapes; {})",
            layout.layout_index,
            layout.layout_name,
            layout.total_shapes,
            if slots.is_empty() {
                "no placeholders".to_string()
            } else {
                slots.join(", ")
            }
        );
    }
    for sample in &metadata.available_slide_types {
        println!(
            "  slide {}: {} ({} shapes)",
            sample.sample_slide_index, sample.description, sample.shape_count
        );
    }

    println!("Metadata: {}", written.metadata_path.display());
    println!("Descriptor: {}", written.functions_path.display());
    Ok(())
}

/// Model-assisted analysis of every template slide.
fn analyze_ai(template: &Path, output: &Path, model: Option<&str>) -> Result<()> {
    let mut config = AiConfig::from_env();
    if let Some(model) = model {
        config = config.with_model(model);
    }

    let analyzer = AiTemplateAnalyzer::new(&config)
        .context("Model-assisted analysis is not configured")?
        .with_output_dir(output);
    let (analysis, written) = analyzer
        .analyze_and_persist(template)
        .with_context(|| format!("Failed to analyze {}", template.display()))?;

    for slide in &analysis.metadata.analyzed_slides {
        println!(
            "  slide {}: {} -> {} ({})",
            slide.slide_index, slide.slide_type, slide.function_name, slide.usage_description
        );
    }
    let fallbacks = analysis.function_codes.iter().filter(|c| c.fallback).count();
    if fallbacks > 0 {
        eprintln!("{} functions fell back to stubs", fallbacks);
    }

    println!("Metadata: {}", written.display());
    Ok(())
}

/// Apply a slide script to a fresh deck and save it.
fn build(descriptor: &Path, script: &Path, output: &Path, template: Option<&Path>) -> Result<()> {
    let loaded = TemplateDescriptor::load(descriptor)
        .with_context(|| format!("Failed to load descriptor {}", descriptor.display()))?;
    let mut builder = match template {
        Some(template) => TemplateBuilder::from_descriptor_with_template(loaded, template),
        None => TemplateBuilder::from_descriptor(loaded),
    }
    .context("Failed to open the template")?;
    let requests = load_script(script)
        .with_context(|| format!("Failed to read slide script {}", script.display()))?;

    log::debug!("Applying {} slide requests", requests.len());
    builder
        .apply(&requests)
        .context("Failed to build slides")?;

    let saved = builder
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} slides to {}",
        builder.get_slide_count(),
        saved.display()
    );
    Ok(())
}

/// Print a summary of a document's text.
fn extract(document: &Path) -> Result<()> {
    let extracted = deckgen_docs::extract_document(document)
        .with_context(|| format!("Failed to extract {}", document.display()))?;

    println!("File Type: {}", extracted.file_type);
    println!("Word Count: {}", extracted.word_count);
    println!();
    println!("First {} characters:", PREVIEW_CHARS);
    println!("{}", extracted.preview(PREVIEW_CHARS));
    Ok(())
}

//! Function synthesis: writes a template's descriptor and metadata artifacts.

use crate::descriptor::TemplateDescriptor;
use crate::error::Result;
use crate::types::TemplateMetadata;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output directory used when the caller does not supply one.
pub const DEFAULT_OUTPUT_DIR: &str = "templates";

/// Paths of the artifacts written for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutput {
    /// `<template_id>_functions.json`
    pub functions_path: PathBuf,
    /// `<template_id>_metadata.json`
    pub metadata_path: PathBuf,
}

/// Path of the descriptor artifact for a template id.
pub fn functions_path(output_dir: &Path, template_id: &str) -> PathBuf {
    output_dir.join(format!("{}_functions.json", template_id))
}

/// Path of the metadata artifact for a template id.
pub fn metadata_path(output_dir: &Path, template_id: &str) -> PathBuf {
    output_dir.join(format!("{}_metadata.json", template_id))
}

/// Emit the descriptor and metadata for a template under `output_dir`.
///
/// The directory is created if absent and existing artifacts are overwritten.
pub fn synthesize(metadata: TemplateMetadata, output_dir: impl AsRef<Path>) -> Result<SynthesisOutput> {
    let output_dir = output_dir.as_ref();
    let metadata_path = write_metadata(&metadata, output_dir)?;

    let descriptor = TemplateDescriptor::from_metadata(metadata);
    let functions_path = functions_path(output_dir, &descriptor.template_id);
    write_json(&functions_path, &descriptor)?;
    log::info!(
        "Wrote {} ({} procedures) to {}",
        descriptor.type_name,
        descriptor.procedure_names().len(),
        functions_path.display()
    );

    Ok(SynthesisOutput {
        functions_path,
        metadata_path,
    })
}

/// Persist metadata as `<output_dir>/<template_id>_metadata.json`.
pub fn write_metadata(metadata: &TemplateMetadata, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = metadata_path(output_dir.as_ref(), &metadata.template_id);
    write_json(&path, metadata)?;
    log::info!("Wrote metadata to {}", path.display());
    Ok(path)
}

/// Write a value as pretty-printed JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

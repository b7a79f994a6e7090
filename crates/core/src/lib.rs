//! Core types for template analysis: metadata records, unit conversion,
//! heuristic slide classification, and template descriptors.

pub mod classify;
pub mod descriptor;
pub mod error;
pub mod naming;
pub mod request;
pub mod synth;
pub mod types;
pub mod units;

pub use classify::{classify, classify_samples, SlideLabel};
pub use descriptor::{Archetype, ArchetypeSpec, RegionRole, TemplateDescriptor};
pub use error::{Error, Result};
pub use request::SlideRequest;
pub use synth::{synthesize, SynthesisOutput, DEFAULT_OUTPUT_DIR};
pub use types::{
    LayoutRecord, PlaceholderType, Position, RunStyle, ShapeKind, ShapeSample, SlideSample,
    SlideTypeSample, SlotRecord, TemplateMetadata,
};

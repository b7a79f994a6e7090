//! PPTX (Office Open XML) template analysis and deck building.
//!
//! Templates are ZIP archives of XML parts. This crate reads their layouts
//! and sample slides into [`deckgen_core::TemplateMetadata`], and builds new
//! decks on a template's layouts from a [`deckgen_core::TemplateDescriptor`].

pub mod analyzer;
pub mod builder;
pub mod deck;
pub mod package;
pub mod parser;
pub mod shapes;
mod xml;

#[cfg(test)]
mod fixture;

pub use analyzer::{assemble, AnalyzerOptions, TemplateAnalyzer};
pub use builder::TemplateBuilder;
pub use deck::DonorDeck;
pub use package::Package;
pub use parser::{ParsedTemplate, PptxParser};

//! Model-assisted template analysis.
//!
//! A [`SlideAdvisor`] classifies each template slide and writes a
//! slide-building procedure for it. [`GeminiAdvisor`] talks to the Gemini
//! API; failures on individual slides degrade to fallback output.

pub mod advisor;
pub mod analyzer;
pub mod config;
pub mod gemini;

pub use advisor::{fallback_code, SlideAdvisor, SlideAnalysis, SlideDescription};
pub use analyzer::{AiAnalysis, AiTemplateAnalyzer, AiTemplateMetadata, GeneratedCode};
pub use config::{AiConfig, API_KEY_ENV};
pub use gemini::GeminiAdvisor;

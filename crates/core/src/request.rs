//! Slide requests for scripted deck building.

use crate::descriptor::Archetype;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One slide to append, with the arguments of its archetype procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlideRequest {
    Title {
        title: String,
        #[serde(default)]
        subtitle: Option<String>,
    },
    Content {
        title: String,
        #[serde(default)]
        bullets: Vec<String>,
    },
    SectionHeader {
        title: String,
    },
    ImagePlaceholder {
        title: String,
        image_prompt: String,
        #[serde(default)]
        context: Option<String>,
    },
    TwoColumn {
        title: String,
        #[serde(default)]
        left_content: Vec<String>,
        #[serde(default)]
        right_content: Vec<String>,
    },
}

impl SlideRequest {
    /// The archetype this request builds.
    pub fn archetype(&self) -> Archetype {
        match self {
            Self::Title { .. } => Archetype::Title,
            Self::Content { .. } => Archetype::Content,
            Self::SectionHeader { .. } => Archetype::SectionHeader,
            Self::ImagePlaceholder { .. } => Archetype::ImagePlaceholder,
            Self::TwoColumn { .. } => Archetype::TwoColumn,
        }
    }
}

/// Read a JSON array of slide requests.
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<SlideRequest>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

//! Identity derivation for templates.
//!
//! Template ids and builder type names are pure functions of the template
//! path, so re-analyzing the same file always lands on the same artifacts.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Regex matching the separators folded into underscores in template ids.
static ID_SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \-]").unwrap());

/// Suffix appended to every derived builder type name.
pub const TYPE_NAME_SUFFIX: &str = "Template";

/// Derive a template id from a file path.
///
/// Takes the file name without its extension, lower-cases it and replaces
/// spaces and hyphens with underscores. Two templates with the same base
/// name in different directories share an id.
pub fn derive_template_id(path: impl AsRef<Path>) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    ID_SEPARATOR_REGEX
        .replace_all(&stem.to_lowercase(), "_")
        .into_owned()
}

/// The file name component of a template path, used as its display name.
pub fn template_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Derive the builder type name for a template id.
///
/// `quarterly_review` becomes `QuarterlyReviewTemplate`.
pub fn derive_type_name(template_id: &str) -> String {
    let mut name: String = template_id.split('_').map(capitalize).collect();
    name.push_str(TYPE_NAME_SUFFIX);
    name
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

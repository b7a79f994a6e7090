//! [`SlideAdvisor`] backed by the Gemini `generateContent` API.

use crate::advisor::{SlideAdvisor, SlideAnalysis, SlideDescription};
use crate::config::AiConfig;
use deckgen_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A response wrapped in a Markdown code fence, optionally tagged.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```$").unwrap());

/// Gemini client.
pub struct GeminiAdvisor {
    client: reqwest::blocking::Client,
    api_key: String,
    url: String,
}

impl GeminiAdvisor {
    /// Create a client. Fails if the configuration has no API key.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            api_key,
            url,
        })
    }

    /// Send one prompt and return the text of the first candidate.
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::ExternalService(format!("Gemini request failed: {}", e)))?;

        let body: GenerateResponse = response
            .json()
            .map_err(|e| Error::ExternalService(format!("Invalid Gemini response: {}", e)))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| strip_code_fence(&p.text))
            .ok_or_else(|| Error::ExternalService("Gemini returned no candidates".to_string()))
    }
}

impl SlideAdvisor for GeminiAdvisor {
    fn classify_slide(&self, slide: &SlideDescription) -> Result<SlideAnalysis> {
        let text = self.generate(&classification_prompt(slide)?)?;
        parse_analysis(&text)
    }

    fn generate_code(&self, slide: &SlideDescription, analysis: &SlideAnalysis) -> Result<String> {
        let code = self.generate(&code_prompt(slide, analysis)?)?;
        if code.trim().is_empty() {
            return Err(Error::ExternalService("Gemini returned empty code".to_string()));
        }
        Ok(code)
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    match CODE_FENCE_REGEX.captures(trimmed) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse and check a classification response.
pub fn parse_analysis(text: &str) -> Result<SlideAnalysis> {
    let analysis: SlideAnalysis = serde_json::from_str(text)
        .map_err(|e| Error::ExternalService(format!("Malformed classification: {}", e)))?;
    if !analysis.is_complete() {
        return Err(Error::ExternalService(
            "Classification is missing required fields".to_string(),
        ));
    }
    Ok(analysis)
}

fn classification_prompt(slide: &SlideDescription) -> Result<String> {
    let shapes = serde_json::to_string_pretty(&slide.shapes)?;
    Ok(format!(
        r#"Analyze this PowerPoint slide structure and provide:

Slide Index: {index}
Number of shapes: {count}
Text content samples: {samples}

Shape details:
{shapes}

Please provide a JSON response with:
1. "slide_type" - What type of slide is this? (e.g., "title_slide", "section_header", "content_bullets", "two_column", "full_image", "chart_slide", etc.)
2. "usage_description" - A single concise line (max 100 chars) describing what this slide should be used for
3. "key_features" - List of 3-5 key visual/layout features
4. "recommended_content" - What type of content works best (one line)
5. "function_name" - Suggested snake_case function name (e.g., "add_title_slide", "add_section_header")

Return ONLY valid JSON, no other text."#,
        index = slide.slide_index,
        count = slide.shape_count,
        samples = slide.text_samples.join(", "),
        shapes = shapes,
    ))
}

fn code_prompt(slide: &SlideDescription, analysis: &SlideAnalysis) -> Result<String> {
    let shapes = serde_json::to_string_pretty(&slide.shapes)?;
    Ok(format!(
        r#"Generate a Rust function that builds this PowerPoint slide.

Slide Type: {slide_type}
Function Name: {name}
Usage: {usage}

Shape Details (positions in inches, font sizes in points):
{shapes}

Requirements:
1. Signature: pub fn {name}(builder: &mut TemplateBuilder, ...) -> Result<()>
2. Start the slide on the most appropriate template layout
3. Add text boxes using the exact positions from the shape details
4. Parameters should accept dynamic content (title, content, bullets, etc.)
5. Include a doc comment describing each parameter
6. Apply the exact font sizes and colours from the shape details

Return ONLY the Rust function, no markdown formatting, no explanations."#,
        slide_type = analysis.slide_type,
        name = analysis.function_name,
        usage = analysis.usage_description,
        shapes = shapes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::SlideSample;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\nfn x() {}\n```\n"), "fn x() {}");
        assert_eq!(strip_code_fence("  plain text "), "plain text");
    }

    #[test]
    fn test_parse_analysis() {
        let text = strip_code_fence(
            "```json\n{\"slide_type\": \"title_slide\", \"usage_description\": \"Opening\", \
             \"key_features\": [\"Centered title\", \"Logo\", \"Dark band\"], \
             \"recommended_content\": \"Deck title\", \"function_name\": \"add_title_slide\"}\n```",
        );
        let analysis = parse_analysis(&text).unwrap();
        assert_eq!(analysis.slide_type, "title_slide");
        assert_eq!(analysis.key_features.len(), 3);
    }

    #[test]
    fn test_parse_analysis_rejects_malformed() {
        assert!(matches!(
            parse_analysis("not json"),
            Err(Error::ExternalService(_))
        ));
        let incomplete = r#"{"slide_type": "", "usage_description": "", "key_features": [],
            "recommended_content": "", "function_name": ""}"#;
        assert!(parse_analysis(incomplete).is_err());
    }

    #[test]
    fn test_parse_analysis_bounds_key_features() {
        let with_features = |n: usize| {
            let features: Vec<String> = (0..n).map(|i| format!("Feature {}", i)).collect();
            serde_json::json!({
                "slide_type": "content_bullets",
                "usage_description": "Lists",
                "key_features": features,
                "recommended_content": "Bullets",
                "function_name": "add_bullets",
            })
            .to_string()
        };
        assert!(parse_analysis(&with_features(2)).is_err());
        assert!(parse_analysis(&with_features(3)).is_ok());
        assert!(parse_analysis(&with_features(5)).is_ok());
        assert!(matches!(
            parse_analysis(&with_features(6)),
            Err(Error::ExternalService(_))
        ));
    }

    #[test]
    fn test_prompts_carry_slide_details() {
        let description = SlideDescription::from_sample(&SlideSample::new(7));
        let prompt = classification_prompt(&description).unwrap();
        assert!(prompt.contains("Slide Index: 7"));
        assert!(prompt.contains("Number of shapes: 0"));

        let analysis = SlideAnalysis::fallback(&description);
        let prompt = code_prompt(&description, &analysis).unwrap();
        assert!(prompt.contains("pub fn add_slide_7(builder: &mut TemplateBuilder"));
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            GeminiAdvisor::new(&AiConfig::default()),
            Err(Error::Configuration(_))
        ));
        let advisor = GeminiAdvisor::new(
            &AiConfig::default()
                .with_api_key("k")
                .with_endpoint("http://localhost:9/v1beta/"),
        )
        .unwrap();
        assert_eq!(
            advisor.url,
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}

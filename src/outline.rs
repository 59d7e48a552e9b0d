//! Outline model: the normalized slide-by-slide content structure.
//!
//! The surrounding application obtains a JSON outline from a language model:
//!
//! ```json
//! {"slides": [{"title": "Intro", "content": ["First point", "Second point"]}]}
//! ```
//!
//! Parsing normalizes that into an immutable [`Outline`]. Missing or
//! structurally wrong pieces (`slides` absent or not a list, `title` absent or
//! not a string) fail the run; soft defects (empty title, non-string content
//! elements) are repaired in place and recorded as warnings.

use crate::error::{Result, SynthesisError};
use crate::warning::{Warning, record};
use serde::Deserialize;

#[derive(Deserialize)]
struct RawOutline {
    slides: Vec<RawSlide>,
}

#[derive(Deserialize)]
struct RawSlide {
    title: String,
    #[serde(default)]
    content: Vec<serde_json::Value>,
}

/// One slide of the outline: a title plus ordered content points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSpec {
    title: String,
    content: Vec<String>,
}

impl SlideSpec {
    /// Create a slide spec directly. Intended for tests and embedding callers
    /// that bypass the JSON contract.
    pub fn new(title: impl Into<String>, content: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }

    /// The slide title.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The ordered content points.
    #[inline]
    pub fn content(&self) -> &[String] {
        &self.content
    }
}

/// The full outline: a non-empty ordered sequence of [`SlideSpec`]s.
///
/// Created once from the parsed model response, immutable thereafter.
#[derive(Debug, Clone)]
pub struct Outline {
    slides: Vec<SlideSpec>,
}

impl Outline {
    /// Parse the model-produced outline JSON.
    ///
    /// Soft repairs performed here, each recorded in `warnings`:
    /// - a present-but-blank title becomes `"Slide N"`
    ///
    /// Silent repairs (no warning, the contract allows them):
    /// - non-string `content` elements are coerced to their JSON string form
    /// - blank content points are dropped
    ///
    /// # Errors
    ///
    /// [`SynthesisError::OutlineParse`] if the text is not valid JSON, if
    /// `slides` is missing or not a list, if any slide lacks a string `title`,
    /// or if the outline contains zero slides.
    pub fn from_json(json: &str, warnings: &mut Vec<Warning>) -> Result<Self> {
        let raw: RawOutline = serde_json::from_str(json)
            .map_err(|e| SynthesisError::OutlineParse(e.to_string()))?;

        if raw.slides.is_empty() {
            return Err(SynthesisError::OutlineParse(
                "outline contains no slides".to_string(),
            ));
        }

        let mut slides = Vec::with_capacity(raw.slides.len());
        for (i, raw_slide) in raw.slides.into_iter().enumerate() {
            let mut title = raw_slide.title.trim().to_string();
            if title.is_empty() {
                title = format!("Slide {}", i + 1);
                record(
                    warnings,
                    Warning::EmptyTitle {
                        slide: i + 1,
                        replacement: title.clone(),
                    },
                );
            }

            let content: Vec<String> = raw_slide
                .content
                .into_iter()
                .map(coerce_content_value)
                .filter(|s| !s.trim().is_empty())
                .collect();

            slides.push(SlideSpec { title, content });
        }

        tracing::debug!(slides = slides.len(), "outline parsed");
        Ok(Self { slides })
    }

    /// The slides, in outline order.
    #[inline]
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    /// Number of outline slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false: the parse rejects empty outlines.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Coerce one `content` array element to text.
///
/// String elements are taken verbatim; anything else keeps its JSON string
/// form rather than failing the run.
fn coerce_content_value(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wellformed_outline() {
        let mut warnings = Vec::new();
        let outline = Outline::from_json(
            r#"{"slides": [{"title": "Intro", "content": ["A", "B"]}]}"#,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline.slides()[0].title(), "Intro");
        assert_eq!(outline.slides()[0].content(), ["A", "B"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_slides_key_fails() {
        let mut warnings = Vec::new();
        let err = Outline::from_json(r#"{"decks": []}"#, &mut warnings).unwrap_err();
        assert!(matches!(err, SynthesisError::OutlineParse(_)));
    }

    #[test]
    fn slides_not_a_list_fails() {
        let mut warnings = Vec::new();
        let err = Outline::from_json(r#"{"slides": "nope"}"#, &mut warnings).unwrap_err();
        assert!(matches!(err, SynthesisError::OutlineParse(_)));
    }

    #[test]
    fn missing_title_fails() {
        let mut warnings = Vec::new();
        let err =
            Outline::from_json(r#"{"slides": [{"content": ["A"]}]}"#, &mut warnings).unwrap_err();
        assert!(matches!(err, SynthesisError::OutlineParse(_)));
    }

    #[test]
    fn non_string_title_fails() {
        let mut warnings = Vec::new();
        let err = Outline::from_json(
            r#"{"slides": [{"title": 42, "content": []}]}"#,
            &mut warnings,
        )
        .unwrap_err();
        assert!(matches!(err, SynthesisError::OutlineParse(_)));
    }

    #[test]
    fn invalid_json_fails() {
        let mut warnings = Vec::new();
        assert!(Outline::from_json("{not json", &mut warnings).is_err());
    }

    #[test]
    fn empty_outline_fails() {
        let mut warnings = Vec::new();
        assert!(Outline::from_json(r#"{"slides": []}"#, &mut warnings).is_err());
    }

    #[test]
    fn blank_title_gets_placeholder_and_warning() {
        let mut warnings = Vec::new();
        let outline = Outline::from_json(
            r#"{"slides": [{"title": "  ", "content": ["A"]}]}"#,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(outline.slides()[0].title(), "Slide 1");
        assert_eq!(
            warnings,
            vec![Warning::EmptyTitle {
                slide: 1,
                replacement: "Slide 1".to_string()
            }]
        );
    }

    #[test]
    fn non_string_content_coerced() {
        let mut warnings = Vec::new();
        let outline = Outline::from_json(
            r#"{"slides": [{"title": "T", "content": ["A", 7, true, {"k": 1}]}]}"#,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(
            outline.slides()[0].content(),
            ["A", "7", "true", r#"{"k":1}"#]
        );
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        let mut warnings = Vec::new();
        let outline =
            Outline::from_json(r#"{"slides": [{"title": "T"}]}"#, &mut warnings).unwrap();
        assert!(outline.slides()[0].content().is_empty());
    }

    #[test]
    fn blank_content_points_dropped() {
        let mut warnings = Vec::new();
        let outline = Outline::from_json(
            r#"{"slides": [{"title": "T", "content": ["A", "   ", ""]}]}"#,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(outline.slides()[0].content(), ["A"]);
    }
}

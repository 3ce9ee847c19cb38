//! Domain types for representing generated slide decks and their sources.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One presentation slide: a title plus bullet lines in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide heading.
    pub title: String,

    /// Bullet points or short paragraphs, rendered in order.
    pub content: Vec<String>,
}

impl Slide {
    /// Create a slide with the given title and no body.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
        }
    }

    /// Append a bullet line to this slide.
    pub fn with_bullet(mut self, text: impl Into<String>) -> Self {
        self.content.push(text.into());
        self
    }

    /// Get non-empty bullet lines.
    pub fn non_empty_bullets(&self) -> Vec<&str> {
        self.content
            .iter()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

/// An ordered, non-empty sequence of slides produced by one generation call.
///
/// There is no way to build an empty deck: a generation that yields no slides
/// is an [`Error::EmptyDeck`], not a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Slide>", into = "Vec<Slide>")]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    /// Wrap a slide list, rejecting an empty one.
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::EmptyDeck);
        }
        Ok(Self { slides })
    }

    /// Number of slides (always at least 1).
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Get the slide at a 0-based index.
    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// All slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Iterate slides in presentation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.slides.iter()
    }
}

impl TryFrom<Vec<Slide>> for Deck {
    type Error = Error;

    fn try_from(slides: Vec<Slide>) -> Result<Self> {
        Deck::new(slides)
    }
}

impl From<Deck> for Vec<Slide> {
    fn from(deck: Deck) -> Self {
        deck.slides
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Slide;
    type IntoIter = std::slice::Iter<'a, Slide>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}

/// The format of an uploaded source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Plain text or Markdown, read as-is.
    PlainText,
    /// Portable Document Format.
    Pdf,
    /// Word document (Office Open XML).
    Docx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "md" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Detect format from a declared MIME type.
    ///
    /// Only `text/*` is recognised here; binary formats are identified by
    /// their extension.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.to_lowercase().starts_with("text/") {
            Some(Self::PlainText)
        } else {
            None
        }
    }

    /// Detect format from a file name and optional MIME type.
    ///
    /// The extension wins; the MIME type is consulted only when the extension
    /// is unknown.
    pub fn detect(name: &str, mime: Option<&str>) -> Result<Self> {
        let ext = extension_of(name);
        Self::from_extension(&ext)
            .or_else(|| mime.and_then(Self::from_mime))
            .ok_or(Error::UnsupportedFormat(ext))
    }

    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lowercased extension after the last dot, or the whole name if there is none.
fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_rejects_empty() {
        assert!(matches!(Deck::new(Vec::new()), Err(Error::EmptyDeck)));
    }

    #[test]
    fn test_deck_deserialize_rejects_empty_array() {
        let result: std::result::Result<Deck, _> = serde_json::from_str("[]");
        assert!(result.is_err());
    }

    #[test]
    fn test_deck_deserialize_preserves_order() {
        let deck: Deck = serde_json::from_str(
            r#"[{"title":"One","content":["a","b"]},{"title":"Two","content":[]}]"#,
        )
        .unwrap();
        assert_eq!(deck.slide_count(), 2);
        assert_eq!(deck.get(0).unwrap().content, vec!["a", "b"]);
        assert_eq!(deck.get(1).unwrap().title, "Two");
    }

    #[test]
    fn test_non_empty_bullets() {
        let slide = Slide::new("T").with_bullet("x").with_bullet("  ").with_bullet("y");
        assert_eq!(slide.non_empty_bullets(), vec!["x", "y"]);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("md"), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_extension("doc"), None);
    }

    #[test]
    fn test_detect_falls_back_to_mime() {
        assert_eq!(
            DocumentFormat::detect("notes.log", Some("text/x-log")).unwrap(),
            DocumentFormat::PlainText
        );
    }

    #[test]
    fn test_detect_unsupported() {
        match DocumentFormat::detect("notes.xyz", None) {
            Err(Error::UnsupportedFormat(ext)) => assert_eq!(ext, "xyz"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

//! Plain-text and Markdown rendering of slides for review.

use crate::types::{Deck, Slide};

/// Marker placed before each bullet in plain-text output.
const BULLET: &str = "•";

/// Formatter for reviewing a deck in a terminal or as Markdown.
#[derive(Debug, Clone, Default)]
pub struct OutlineFormatter;

impl OutlineFormatter {
    /// Create a new formatter.
    pub fn new() -> Self {
        Self
    }

    /// Render one slide with its position in the deck.
    ///
    /// # Example output
    /// ```text
    /// Slide 2 of 3
    ///
    /// Facts
    ///
    /// • Sky is blue
    /// • Water boils at 100C
    /// ```
    pub fn format_slide(&self, slide: &Slide, index: usize, total: usize) -> String {
        let mut out = format!("Slide {} of {}\n\n{}", index + 1, total, slide.title);

        let bullets = slide.non_empty_bullets();
        if !bullets.is_empty() {
            out.push_str("\n\n");
            let lines: Vec<String> = bullets
                .iter()
                .map(|b| format!("{} {}", BULLET, b))
                .collect();
            out.push_str(&lines.join("\n"));
        }

        out
    }

    /// Render a whole deck as plain text, one block per slide.
    pub fn format_deck(&self, deck: &Deck) -> String {
        let total = deck.slide_count();
        deck.iter()
            .enumerate()
            .map(|(i, slide)| self.format_slide(slide, i, total))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render a whole deck as Markdown with a trailing newline.
    pub fn to_markdown(&self, deck: &Deck) -> String {
        let mut out = String::new();
        for slide in deck {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("## {}\n", slide.title));
            for bullet in slide.non_empty_bullets() {
                out.push_str(&format!("- {}\n", bullet));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deck() -> Deck {
        Deck::new(vec![
            Slide::new("Intro").with_bullet("Point A"),
            Slide::new("Facts")
                .with_bullet("Sky is blue")
                .with_bullet("Water boils at 100C"),
            Slide::new("Conclusion"),
        ])
        .unwrap()
    }

    #[test]
    fn test_format_slide() {
        let formatter = OutlineFormatter::new();
        let deck = sample_deck();

        assert_eq!(
            formatter.format_slide(deck.get(1).unwrap(), 1, 3),
            "Slide 2 of 3\n\nFacts\n\n• Sky is blue\n• Water boils at 100C"
        );
    }

    #[test]
    fn test_format_slide_without_bullets() {
        let formatter = OutlineFormatter::new();
        let deck = sample_deck();

        assert_eq!(
            formatter.format_slide(deck.get(2).unwrap(), 2, 3),
            "Slide 3 of 3\n\nConclusion"
        );
    }

    #[test]
    fn test_format_deck_separates_slides() {
        let formatter = OutlineFormatter::new();
        let text = formatter.format_deck(&sample_deck());

        assert!(text.starts_with("Slide 1 of 3\n\nIntro\n\n• Point A\n\nSlide 2 of 3"));
        assert!(text.ends_with("Slide 3 of 3\n\nConclusion"));
    }

    #[test]
    fn test_to_markdown() {
        let formatter = OutlineFormatter::new();

        assert_eq!(
            formatter.to_markdown(&sample_deck()),
            "## Intro\n- Point A\n\n## Facts\n- Sky is blue\n- Water boils at 100C\n\n## Conclusion\n"
        );
    }
}

//! Text normalization for extracted document text.
//!
//! Cleans up the raw output of PDF and DOCX extraction before it becomes the
//! editable source buffer: line endings, Unicode composition, stray
//! whitespace, and runs of blank lines.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of spaces and tabs into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Regex to collapse three or more newlines into a single blank line.
static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Invisible characters PDF producers like to leave behind.
const INVISIBLE_CHARS: &[char] = &[
    '\u{00AD}', // soft hyphen
    '\u{200B}', // zero width space
    '\u{FEFF}', // byte order mark
];

/// Text normalizer for extracted source documents.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Create a new text normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a single line of text.
    ///
    /// - Composes Unicode to NFC
    /// - Drops soft hyphens, zero-width spaces and BOMs
    /// - Collapses space/tab runs
    /// - Trims trailing whitespace
    pub fn normalize_line(&self, text: &str) -> String {
        let composed: String = text
            .nfc()
            .filter(|c| !INVISIBLE_CHARS.contains(c))
            .collect();

        WHITESPACE_COLLAPSE_REGEX
            .replace_all(&composed, " ")
            .trim_end()
            .to_string()
    }

    /// Normalize a whole extracted document.
    ///
    /// Line endings become `\n`, every line goes through
    /// [`normalize_line`](Self::normalize_line), runs of blank lines shrink to
    /// one, and leading/trailing blank lines are removed. A single blank line
    /// between blocks (such as PDF pages) survives.
    pub fn normalize_source(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");

        let lines: Vec<String> = unified
            .split('\n')
            .map(|line| self.normalize_line(line))
            .collect();

        let joined = lines.join("\n");
        let collapsed = BLANK_LINES_REGEX.replace_all(&joined, "\n\n");

        collapsed.trim_matches('\n').to_string()
    }
}

/// Whether the text has any non-whitespace content.
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

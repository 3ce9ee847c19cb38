//! Presentation session: the state machine behind the generate / review /
//! download workflow.
//!
//! A [`Session`] is owned by the front end and passed by `&mut` to every
//! transition. Long-running work is split into `begin_*` and `finish_*`
//! steps so an event loop can run the suspension in between. While a parse
//! or a generation is in flight the matching busy flag is set and further
//! requests are ignored. Nothing here cancels or times out a running
//! operation; it always runs to completion or failure.

use std::path::{Path, PathBuf};

use crate::document::{DocumentLoader, SourceFile};
use crate::error::{Error, Result};
use crate::export::{DeckExporter, PresentationWriter};
use crate::generator::{CompletionClient, SlideGenerator};
use crate::normalize::has_content;
use crate::types::{Deck, DocumentFormat, Slide};

/// Shown when generation is requested for blank text.
pub const EMPTY_INPUT_MESSAGE: &str =
    "Please enter some text or upload a document to generate a presentation.";

/// Shown when the service answered with zero slides.
pub const EMPTY_DECK_MESSAGE: &str = "The AI could not generate slides from the provided text. \
     Please try again with different content.";

/// Shown for transport failures and malformed responses.
pub const GENERATION_FAILED_MESSAGE: &str = "An error occurred while generating the presentation. \
     Please check your API key and try again.";

/// Shown when saving the presentation file fails.
pub const EXPORT_FAILED_MESSAGE: &str = "Could not save the presentation. Please try again.";

/// Coarse-grained state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing generated yet.
    Idle,
    /// A document is being turned into source text.
    ParsingDocument,
    /// A generation request is in flight.
    GeneratingDeck,
    /// The last generation attempt failed; see [`Session::error_message`].
    Error,
    /// A deck is available for review.
    Ready,
}

/// A transient, user-facing notification.
///
/// Alerts are returned to the caller instead of being stored: they are shown
/// once and never become part of the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    message: String,
    detail: Option<String>,
}

impl Alert {
    /// Create an alert with a message for the user.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Build the alert for a failed document load.
    pub fn for_load_error(error: &Error, file_name: &str) -> Self {
        match error {
            Error::UnsupportedFormat(ext) => Self::new(format!(
                "Unsupported file type: .{}. Please upload a .txt, .md, .pdf, or .docx file.",
                ext
            )),
            Error::MissingExtractor(format) => {
                Self::new(format!("{} processing library is not loaded.", format))
            }
            other => {
                let what = DocumentFormat::detect(file_name, None)
                    .map(|f| format!("{} file", f))
                    .unwrap_or_else(|_| "file".to_string());
                Self::new(format!("Failed to parse {}.", what)).with_detail(other.to_string())
            }
        }
    }

    /// Message to show the user.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Underlying cause, for logs.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// What happened to a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Another operation was in flight; nothing changed.
    Ignored,
    /// The text was blank; the session is in [`Phase::Error`].
    Rejected,
    /// Generation started (and, for [`Session::submit_text`], finished).
    Started,
}

/// What happened to a file selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    /// Another operation was in flight; nothing changed.
    Ignored,
    /// The file's text is now the source text.
    Loaded,
    /// Loading failed; the source text and file name were cleared.
    Failed(Alert),
}

/// What happened to an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// There is no deck to export.
    Skipped,
    /// The presentation was written to this path.
    Saved(PathBuf),
    /// Writing failed; the deck is still available for another attempt.
    Failed(Alert),
}

/// Application state for one editing session.
#[derive(Debug, Clone)]
pub struct Session {
    deck: Option<Deck>,
    current_index: usize,
    phase: Phase,
    error_message: Option<String>,
    source_text: String,
    selected_file: Option<String>,
    parsing: bool,
    generating: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a fresh session with no deck.
    pub fn new() -> Self {
        Self {
            deck: None,
            current_index: 0,
            phase: Phase::Idle,
            error_message: None,
            source_text: String::new(),
            selected_file: None,
            parsing: false,
            generating: false,
        }
    }

    /// Current phase. A running document parse takes precedence.
    pub fn phase(&self) -> Phase {
        if self.parsing {
            Phase::ParsingDocument
        } else {
            self.phase
        }
    }

    /// The generated deck, if any.
    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    /// Index of the slide under review.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The slide under review, if a deck is present.
    pub fn current_slide(&self) -> Option<&Slide> {
        self.deck.as_ref().and_then(|d| d.get(self.current_index))
    }

    /// Message describing the last failed generation.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The editable source text buffer.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// Name of the most recently selected file.
    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    /// Whether a parse or a generation is in flight.
    pub fn is_busy(&self) -> bool {
        self.parsing || self.generating
    }

    /// Replace the source text with a direct edit. Ignored while busy.
    pub fn set_source_text(&mut self, text: impl Into<String>) -> bool {
        if self.is_busy() {
            return false;
        }
        self.source_text = text.into();
        true
    }

    /// First half of a generation request.
    ///
    /// On [`Submission::Started`] the caller must run the generator and hand
    /// its outcome to [`finish_generation`](Self::finish_generation).
    pub fn begin_generation(&mut self, text: &str) -> Submission {
        if self.is_busy() {
            log::debug!("Generation requested while busy; ignoring");
            return Submission::Ignored;
        }

        if !has_content(text) {
            self.phase = Phase::Error;
            self.error_message = Some(EMPTY_INPUT_MESSAGE.to_string());
            return Submission::Rejected;
        }

        self.generating = true;
        self.phase = Phase::GeneratingDeck;
        self.deck = None;
        self.error_message = None;
        self.current_index = 0;
        Submission::Started
    }

    /// Second half of a generation request.
    pub fn finish_generation(&mut self, outcome: Result<Deck>) {
        if !self.generating {
            log::warn!("Generation result arrived with no request in flight; dropping it");
            return;
        }
        self.generating = false;

        match outcome {
            Ok(deck) => {
                log::debug!("Deck ready with {} slides", deck.slide_count());
                self.deck = Some(deck);
                self.current_index = 0;
                self.phase = Phase::Ready;
            }
            Err(Error::EmptyDeck) => {
                self.phase = Phase::Error;
                self.error_message = Some(EMPTY_DECK_MESSAGE.to_string());
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.phase = Phase::Error;
                self.error_message = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Generate a deck from `text` and apply the result.
    pub async fn submit_text<C: CompletionClient>(
        &mut self,
        text: &str,
        generator: &SlideGenerator<C>,
    ) -> Submission {
        let submission = self.begin_generation(text);
        if submission == Submission::Started {
            let outcome = generator.generate(text).await;
            self.finish_generation(outcome);
        }
        submission
    }

    /// First half of a file selection. Returns `false` when busy.
    pub fn begin_file_selection(&mut self, file_name: &str) -> bool {
        if self.is_busy() {
            log::debug!("File selected while busy; ignoring {}", file_name);
            return false;
        }
        self.parsing = true;
        self.source_text.clear();
        self.selected_file = Some(file_name.to_string());
        true
    }

    /// Second half of a file selection.
    pub fn finish_file_selection(&mut self, outcome: Result<String>) -> FileSelection {
        if !self.parsing {
            log::warn!("Parse result arrived with no parse in flight; dropping it");
            return FileSelection::Ignored;
        }
        self.parsing = false;

        match outcome {
            Ok(text) => {
                self.source_text = text;
                FileSelection::Loaded
            }
            Err(e) => {
                let name = self.selected_file.take().unwrap_or_default();
                let alert = Alert::for_load_error(&e, &name);
                log::warn!("Failed to load {}: {}", name, e);
                self.source_text.clear();
                FileSelection::Failed(alert)
            }
        }
    }

    /// Load a file into the source text buffer.
    pub fn select_file(&mut self, file: &SourceFile, loader: &DocumentLoader) -> FileSelection {
        if !self.begin_file_selection(&file.name) {
            return FileSelection::Ignored;
        }
        let outcome = loader.load(file);
        self.finish_file_selection(outcome)
    }

    /// Move to the next slide. Stays put on the last slide.
    pub fn next_slide(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let total = self.deck.as_ref().map_or(0, Deck::slide_count);
        if self.current_index + 1 < total {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous slide. Stays put on the first slide.
    pub fn prev_slide(&mut self) -> bool {
        if self.phase != Phase::Ready || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Save the current deck as `presentation.pptx` in `dir`.
    ///
    /// Never changes the session; a failure is logged and reported as an
    /// alert so the user can retry.
    pub fn export_current_deck<W: PresentationWriter>(
        &self,
        exporter: &DeckExporter<W>,
        dir: &Path,
    ) -> ExportOutcome {
        let Some(deck) = self.deck.as_ref() else {
            return ExportOutcome::Skipped;
        };

        match exporter.export(deck, dir) {
            Ok(path) => ExportOutcome::Saved(path),
            Err(e) => {
                log::error!("Export failed: {}", e);
                ExportOutcome::Failed(Alert::new(EXPORT_FAILED_MESSAGE).with_detail(e.to_string()))
            }
        }
    }
}

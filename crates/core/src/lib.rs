//! Core domain types, session state machine, and collaborator contracts
//! for turning text into a reviewed, exportable slide deck.

pub mod document;
pub mod error;
pub mod export;
pub mod generator;
pub mod normalize;
pub mod outline;
pub mod session;
pub mod types;

pub use document::{DocumentLoader, SourceFile, TextExtractor};
pub use error::{Error, Result};
pub use export::{DeckExporter, PresentationWriter, EXPORT_FILE_NAME};
pub use generator::{CompletionClient, CompletionRequest, SlideGenerator};
pub use normalize::TextNormalizer;
pub use outline::OutlineFormatter;
pub use session::{Alert, ExportOutcome, FileSelection, Phase, Session, Submission};
pub use types::{Deck, DocumentFormat, Slide};

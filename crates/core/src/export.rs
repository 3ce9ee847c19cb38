//! Export of a generated deck to a presentation file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Deck;

/// File name every export is saved under.
pub const EXPORT_FILE_NAME: &str = "presentation.pptx";

/// Presentation-file writer collaborator.
pub trait PresentationWriter {
    /// Build the complete presentation file for a deck.
    fn build_file(&self, deck: &Deck) -> Result<Vec<u8>>;
}

/// Saves decks as `presentation.pptx` using a [`PresentationWriter`].
#[derive(Debug, Clone)]
pub struct DeckExporter<W> {
    writer: W,
}

impl<W: PresentationWriter> DeckExporter<W> {
    /// Create an exporter around a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Access the underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Build the file and save it into `dir`, returning the written path.
    pub fn export(&self, deck: &Deck, dir: &Path) -> Result<PathBuf> {
        let bytes = self.writer.build_file(deck)?;

        let path = dir.join(EXPORT_FILE_NAME);
        let mut file = File::create(&path).map_err(|e| {
            Error::Export(format!("Failed to create {}: {}", path.display(), e))
        })?;
        file.write_all(&bytes).map_err(|e| {
            Error::Export(format!("Failed to write to {}: {}", path.display(), e))
        })?;

        log::debug!(
            "Exported {} slides ({} bytes) to {}",
            deck.slide_count(),
            bytes.len(),
            path.display()
        );
        Ok(path)
    }
}

//! PPTX (Office Open XML) backend for slide decks.
//!
//! Writes a deck as a 16:9 PowerPoint package and reads such packages back
//! into slides. Packages are ZIP archives of XML parts.

pub mod reader;
pub mod templates;
pub mod writer;

pub use reader::PptxReader;
pub use writer::PptxWriter;

#[cfg(test)]
mod tests {
    use super::*;
    use slidegen_core::{Deck, DeckExporter, Slide, EXPORT_FILE_NAME};
    use std::fs::File;

    #[test]
    fn test_export_writes_readable_presentation() {
        let dir = tempfile::tempdir().unwrap();
        let deck = Deck::new(vec![
            Slide::new("Photosynthesis").with_bullet("Light in").with_bullet("Sugar out"),
            Slide::new("Summary").with_bullet("Plants make food"),
        ])
        .unwrap();

        let path = DeckExporter::new(PptxWriter::new()).export(&deck, dir.path()).unwrap();
        assert_eq!(path, dir.path().join(EXPORT_FILE_NAME));

        let read = PptxReader::new().read(File::open(&path).unwrap()).unwrap();
        assert_eq!(read, deck);
    }

    #[test]
    fn test_export_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = DeckExporter::new(PptxWriter::new());

        let first = Deck::new(vec![Slide::new("A"), Slide::new("B"), Slide::new("C")]).unwrap();
        let second = Deck::new(vec![Slide::new("Only")]).unwrap();
        exporter.export(&first, dir.path()).unwrap();
        let path = exporter.export(&second, dir.path()).unwrap();

        let read = PptxReader::new().read(File::open(&path).unwrap()).unwrap();
        assert_eq!(read.slide_count(), 1);
        assert_eq!(read.slides()[0].title, "Only");
    }
}

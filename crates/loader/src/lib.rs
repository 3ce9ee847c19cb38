//! Text-extraction backends for source documents.
//!
//! PDF files go through `lopdf`; DOCX files are ZIP archives whose
//! `word/document.xml` is read directly.

pub mod docx;
pub mod pdf;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

use slidegen_core::DocumentLoader;

/// A document loader with every available extraction backend registered.
pub fn default_loader() -> DocumentLoader {
    DocumentLoader::new()
        .with_pdf(PdfExtractor::new())
        .with_docx(DocxExtractor::new())
}

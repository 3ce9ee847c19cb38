//! Document loading: turns a user-selected file into editable source text.
//!
//! Binary formats are delegated to [`TextExtractor`] collaborators, one per
//! format. A loader without a collaborator for a format reports the format as
//! unavailable rather than guessing.

use std::path::Path;

use crate::error::{Error, Result};
use crate::normalize::TextNormalizer;
use crate::types::DocumentFormat;

/// A file picked by the user: its name, declared type, and raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name (without directories); used for format detection.
    pub name: String,

    /// Declared MIME type, if the caller knows one.
    pub mime_type: Option<String>,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source file from in-memory bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    /// Attach a declared MIME type.
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    /// Read a file from disk, guessing its MIME type from the path.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_owned());

        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    /// Detect the document format from name and declared type.
    pub fn format(&self) -> Result<DocumentFormat> {
        DocumentFormat::detect(&self.name, self.mime_type.as_deref())
    }
}

/// A text-extraction collaborator for one binary document format.
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from the raw document bytes.
    ///
    /// Implementations report their own failures as [`Error::DocumentParse`].
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Loads source text from user-selected files.
pub struct DocumentLoader {
    pdf: Option<Box<dyn TextExtractor>>,
    docx: Option<Box<dyn TextExtractor>>,
    normalizer: TextNormalizer,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader {
    /// Create a loader that only understands plain text.
    pub fn new() -> Self {
        Self {
            pdf: None,
            docx: None,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Register the PDF extraction collaborator.
    pub fn with_pdf(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.pdf = Some(Box::new(extractor));
        self
    }

    /// Register the DOCX extraction collaborator.
    pub fn with_docx(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.docx = Some(Box::new(extractor));
        self
    }

    /// Load the text content of a file.
    ///
    /// Unsupported files fail before any collaborator is consulted.
    pub fn load(&self, file: &SourceFile) -> Result<String> {
        let format = file.format()?;
        log::debug!("Loading {} as {}", file.name, format);

        match format {
            DocumentFormat::PlainText => Ok(String::from_utf8_lossy(&file.bytes).into_owned()),
            DocumentFormat::Pdf | DocumentFormat::Docx => {
                let extractor = self.extractor_for(format).ok_or_else(|| {
                    log::warn!("No {} extractor registered", format);
                    Error::MissingExtractor(format)
                })?;

                let raw = extractor.extract_text(&file.bytes).map_err(|e| {
                    log::warn!("Failed to extract text from {}: {}", file.name, e);
                    match e {
                        Error::DocumentParse(_) => e,
                        other => Error::DocumentParse(other.to_string()),
                    }
                })?;

                Ok(self.normalizer.normalize_source(&raw))
            }
        }
    }

    fn extractor_for(&self, format: DocumentFormat) -> Option<&dyn TextExtractor> {
        match format {
            DocumentFormat::Pdf => self.pdf.as_deref(),
            DocumentFormat::Docx => self.docx.as_deref(),
            DocumentFormat::PlainText => None,
        }
    }
}

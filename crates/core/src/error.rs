//! Error types for slide deck generation.

use thiserror::Error;

use crate::types::DocumentFormat;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading content, generating a deck, or exporting it.
#[derive(Error, Debug)]
pub enum Error {
    /// The source text was blank or whitespace-only.
    #[error("No content provided")]
    EmptyInput,

    /// The uploaded file type is not one we can read.
    #[error("Unsupported file type: .{0}")]
    UnsupportedFormat(String),

    /// A text-extraction collaborator failed.
    #[error("Document parsing error: {0}")]
    DocumentParse(String),

    /// No text-extraction collaborator is registered for this format.
    #[error("{0} processing library is not loaded")]
    MissingExtractor(DocumentFormat),

    /// The generative service could not be reached or rejected the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The generative service answered with something that is not a slide array.
    #[error("Malformed slide response: {0}")]
    MalformedResponse(String),

    /// The generative service answered with an empty slide array.
    #[error("No slides were generated")]
    EmptyDeck,

    /// Building the presentation file failed.
    #[error("Export error: {0}")]
    Export(String),

    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

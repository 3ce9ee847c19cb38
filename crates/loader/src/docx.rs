//! DOCX raw text extraction.

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use slidegen_core::{Error, Result, TextExtractor};
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

/// Path of the main document part inside the package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from Word documents.
pub struct DocxExtractor;

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text from a DOCX package, one paragraph per block.
    pub fn extract<R: Read + Seek>(&self, reader: R) -> Result<String> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::DocumentParse(format!("Failed to open ZIP: {}", e)))?;

        let xml = read_part(&mut archive, DOCUMENT_PART)?;
        let paragraphs = paragraphs_from_xml(&xml)?;
        log::debug!("Extracted {} DOCX paragraphs", paragraphs.len());

        Ok(paragraphs.join("\n\n"))
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        self.extract(Cursor::new(bytes))
    }
}

/// Collect the text of every `w:p` in document order.
///
/// Runs are concatenated; inside a run `w:tab` becomes a tab and
/// `w:br`/`w:cr` a newline. Paragraphs nested in text boxes come out as their
/// own blocks right after the paragraph that anchors them. `mc:Fallback`
/// subtrees repeat the `mc:Choice` content and are skipped.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    // keep whitespace: <w:t xml:space="preserve"> runs carry meaningful spaces
    reader.trim_text(false);

    let mut paragraphs = Vec::new();
    // open paragraphs, innermost last
    let mut open: Vec<String> = Vec::new();
    // finished text-box paragraphs waiting for their anchor to close
    let mut nested: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"Fallback" => {
                    let name = e.name().as_ref().to_vec();
                    reader
                        .read_to_end(QName(&name))
                        .map_err(|e| Error::DocumentParse(format!("Error parsing {}: {}", DOCUMENT_PART, e)))?;
                }
                b"p" => open.push(String::new()),
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            // tab stops in w:pPr are also named w:tab; only runs produce text
            Ok(Event::Empty(ref e)) if run_depth > 0 => {
                if let Some(current) = open.last_mut() {
                    match local_name(e.name().as_ref()) {
                        b"tab" => current.push('\t'),
                        b"br" | b"cr" => current.push('\n'),
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::DocumentParse(format!("Bad text run: {}", e)))?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => {
                    if let Some(text) = open.pop() {
                        if open.is_empty() {
                            paragraphs.push(text);
                            paragraphs.append(&mut nested);
                        } else {
                            nested.push(text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::DocumentParse(format!(
                    "Error parsing {}: {}",
                    DOCUMENT_PART, e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Read a part from the ZIP archive.
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::DocumentParse(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::DocumentParse(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

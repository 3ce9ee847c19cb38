//! PDF text extraction.

use lopdf::Document;
use slidegen_core::{Error, Result, TextExtractor};

/// Extracts text from every page of a PDF, in page order.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| Error::DocumentParse(format!("Failed to open PDF: {}", e)))?;

        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(Error::DocumentParse("PDF is encrypted".to_string()));
        }

        // get_pages is keyed by 1-based page number, so iteration is page order
        let pages = doc.get_pages();
        log::debug!("Extracting text from {} PDF pages", pages.len());

        join_pages(pages.keys().map(|&number| {
            doc.extract_text(&[number]).map_err(|e| {
                Error::DocumentParse(format!("Failed to read page {}: {}", number, e))
            })
        }))
    }
}

/// Join per-page texts with a blank line between pages.
///
/// The first page that failed aborts the whole document.
pub fn join_pages<I>(pages: I) -> Result<String>
where
    I: IntoIterator<Item = Result<String>>,
{
    let texts = pages.into_iter().collect::<Result<Vec<String>>>()?;

    Ok(texts
        .iter()
        .map(|t| t.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF with one line of text per page.
    fn pdf_with_pages(lines: &[&str], encrypted: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if encrypted {
            let encrypt_id = doc.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
            });
            doc.trailer.set("Encrypt", encrypt_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pages_in_order_with_blank_line_between() {
        let bytes = pdf_with_pages(&["Alpha page", "Beta page"], false);

        let text = PdfExtractor::new().extract_text(&bytes).unwrap();

        let alpha = text.find("Alpha page").unwrap();
        let beta = text.find("Beta page").unwrap();
        assert!(alpha < beta);
        assert!(text[alpha..beta].contains("\n\n"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_encrypted_pdf_is_a_parse_error() {
        let bytes = pdf_with_pages(&["Secret"], true);

        let err = PdfExtractor::new().extract_text(&bytes).unwrap_err();

        assert!(matches!(err, Error::DocumentParse(_)));
    }

    #[test]
    fn test_join_pages_blank_line_between_pages() {
        let joined = join_pages(vec![
            Ok("First page\n".to_string()),
            Ok("Second page".to_string()),
            Ok("Third page\n\n".to_string()),
        ])
        .unwrap();

        assert_eq!(joined, "First page\n\nSecond page\n\nThird page");
    }

    #[test]
    fn test_join_pages_fails_on_any_page() {
        let result = join_pages(vec![
            Ok("First page".to_string()),
            Err(Error::DocumentParse("page 2".to_string())),
            Ok("Third page".to_string()),
        ]);

        assert!(matches!(result, Err(Error::DocumentParse(ref m)) if m == "page 2"));
    }

    #[test]
    fn test_join_pages_empty_document() {
        assert_eq!(join_pages(Vec::new()).unwrap(), "");
    }

    #[test]
    fn test_garbage_bytes_are_a_parse_error() {
        let err = PdfExtractor::new()
            .extract_text(b"definitely not a pdf")
            .unwrap_err();

        assert!(matches!(err, Error::DocumentParse(_)));
    }
}

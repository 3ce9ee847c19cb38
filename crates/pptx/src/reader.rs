//! Reads a PPTX package back into a [`Deck`].
//!
//! The topmost text shape on a slide is taken as its title; every non-empty
//! paragraph of the remaining shapes becomes a bullet.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidegen_core::{Deck, Error, Result, Slide};
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read every slide of a package, in presentation order.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Deck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::DocumentParse(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.slide_order(&mut archive)?;
        log::debug!("Found {} slide parts", slide_order.len());

        let slides = slide_order
            .iter()
            .map(|path| self.read_slide(&mut archive, path))
            .collect::<Result<Vec<_>>>()?;

        Deck::new(slides)
            .map_err(|_| Error::DocumentParse("presentation has no slides".to_string()))
    }

    /// Slide part paths ordered by relationship id.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_part(archive, PRESENTATION_RELS)?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attribute(e, b"Id").unwrap_or_default();
                    let rel_type = attribute(e, b"Type").unwrap_or_default();
                    let target = attribute(e, b"Target").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        let order = extract_slide_number(&id).or_else(|| extract_slide_number(&target));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::DocumentParse(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn read_slide<R: Read + Seek>(&self, archive: &mut ZipArchive<R>, path: &str) -> Result<Slide> {
        let xml = read_part(archive, path)?;
        let mut shapes = text_shapes(&xml)?;

        // top-to-bottom, then left-to-right
        shapes.sort_by(|a, b| (a.y, a.x).cmp(&(b.y, b.x)));

        let mut shapes = shapes.into_iter();
        let title = shapes
            .next()
            .map(|shape| shape.paragraphs.join(" "))
            .unwrap_or_default();
        let content = shapes.flat_map(|shape| shape.paragraphs).collect();

        Ok(Slide { title, content })
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// A text-bearing shape and its offset in EMU.
#[derive(Debug, Default)]
struct ShapeText {
    paragraphs: Vec<String>,
    x: i64,
    y: i64,
}

/// Collect shapes that carry at least one non-empty paragraph.
fn text_shapes(xml: &str) -> Result<Vec<ShapeText>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut shapes = Vec::new();
    let mut current: Option<ShapeText> = None;
    let mut paragraph = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => current = Some(ShapeText::default()),
                b"p" => {
                    in_paragraph = true;
                    paragraph.clear();
                }
                b"t" => in_text = true,
                b"br" if in_paragraph => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"off" => {
                    if let Some(shape) = current.as_mut() {
                        shape.x = attribute(e, b"x").and_then(|v| v.parse().ok()).unwrap_or(0);
                        shape.y = attribute(e, b"y").and_then(|v| v.parse().ok()).unwrap_or(0);
                    }
                }
                b"br" if in_paragraph => paragraph.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::DocumentParse(format!("Bad text run: {}", e)))?;
                paragraph.push_str(&text);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" if in_paragraph => {
                    in_paragraph = false;
                    let text = paragraph.trim();
                    if let (Some(shape), false) = (current.as_mut(), text.is_empty()) {
                        shape.paragraphs.push(text.to_string());
                    }
                }
                b"sp" => {
                    if let Some(shape) = current.take() {
                        if !shape.paragraphs.is_empty() {
                            shapes.push(shape);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::DocumentParse(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

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

/// Trailing number of a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml");
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    s[start..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::PptxWriter;
    use slidegen_core::PresentationWriter;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    #[test]
    fn test_reads_back_written_deck() {
        let deck = Deck::new(vec![
            Slide::new("Intro").with_bullet("Point A").with_bullet("Salt & pepper"),
            Slide::new("Facts"),
            Slide::new("Conclusion").with_bullet("Wrap up"),
        ])
        .unwrap();

        let bytes = PptxWriter::new().build_file(&deck).unwrap();
        let read = PptxReader::new().read(Cursor::new(bytes)).unwrap();

        assert_eq!(read, deck);
    }

    #[test]
    fn test_multiline_bullet_survives() {
        let deck = Deck::new(vec![Slide::new("T").with_bullet("line one\nline two")]).unwrap();

        let bytes = PptxWriter::new().build_file(&deck).unwrap();
        let read = PptxReader::new().read(Cursor::new(bytes)).unwrap();

        assert_eq!(read.slides()[0].content, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn test_slides_ordered_by_relationship_id() {
        let rels = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId10" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide10.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;
        let slide = |title: &str| {
            format!(
                r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree><p:sp><p:spPr><a:xfrm><a:off x="0" y="0"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
                title
            )
        };

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, xml) in [
            (PRESENTATION_RELS.to_string(), rels.to_string()),
            ("ppt/slides/slide2.xml".to_string(), slide("Second")),
            ("ppt/slides/slide10.xml".to_string(), slide("Tenth")),
        ] {
            zip.start_file(path, FileOptions::default()).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();

        let deck = PptxReader::new().read(Cursor::new(bytes)).unwrap();
        let titles: Vec<&str> = deck.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "Tenth"]);
    }

    #[test]
    fn test_lower_shape_is_content_even_if_first_in_tree() {
        let xml = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>
<p:sp><p:spPr><a:xfrm><a:off x="0" y="2000"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Body</a:t></a:r></a:p><a:p><a:endParaRPr/></a:p></p:txBody></p:sp>
<p:sp><p:spPr><a:xfrm><a:off x="0" y="100"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Heading</a:t></a:r></a:p></p:txBody></p:sp>
</p:spTree></p:cSld></p:sld>"#;

        let mut shapes = text_shapes(xml).unwrap();
        shapes.sort_by(|a, b| (a.y, a.x).cmp(&(b.y, b.x)));

        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].paragraphs, vec!["Heading".to_string()]);
        assert_eq!(shapes[1].paragraphs, vec!["Body".to_string()]);
    }

    #[test]
    fn test_not_a_package() {
        let err = PptxReader::new().read(Cursor::new(b"nope".to_vec())).unwrap_err();
        assert!(matches!(err, Error::DocumentParse(_)));
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }
}

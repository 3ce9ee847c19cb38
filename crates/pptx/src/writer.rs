//! PPTX package writer.
//!
//! Every slide gets the same two text boxes on a blank 16:9 layout: a bold
//! centered title across the top and a bulleted body below it.

use crate::templates::{self, NS_A, NS_P, NS_R, REL_SLIDE, REL_SLIDE_MASTER, REL_THEME, SP_TREE_HEADER};
use quick_xml::escape::escape;
use slidegen_core::{Deck, Error, PresentationWriter, Result, Slide};
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const EMU_PER_INCH: i64 = 914_400;

/// 10in x 5.625in.
pub const SLIDE_WIDTH: i64 = 9_144_000;
pub const SLIDE_HEIGHT: i64 = 5_143_500;

/// Position and size of a text box in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Title box: 0.5in from the left, 0.25in from the top, 90% wide, 1in tall.
pub const TITLE_FRAME: Frame = Frame {
    x: EMU_PER_INCH / 2,
    y: EMU_PER_INCH / 4,
    cx: SLIDE_WIDTH * 9 / 10,
    cy: EMU_PER_INCH,
};

/// Body box: same column as the title, 1.5in from the top, 4in tall.
pub const BODY_FRAME: Frame = Frame {
    x: EMU_PER_INCH / 2,
    y: EMU_PER_INCH * 3 / 2,
    cx: SLIDE_WIDTH * 9 / 10,
    cy: EMU_PER_INCH * 4,
};

/// Font sizes in hundredths of a point.
const TITLE_SIZE: u32 = 3200;
const BODY_SIZE: u32 = 1800;

const TITLE_COLOR: &str = "363636";
const BODY_COLOR: &str = "4F4F4F";

/// Bullet indent in EMU.
const BULLET_INDENT: i64 = 285_750;

const DEFAULT_DOCUMENT_TITLE: &str = "Presentation";

/// Writes a [`Deck`] as a PowerPoint package.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter;

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self
    }

    /// Write the package to any seekable sink.
    ///
    /// The first slide's title doubles as the document title.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, sink: W) -> Result<W> {
        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let count = deck.slide_count();
        let document_title = deck
            .get(0)
            .map(|slide| xml_safe(slide.title.trim()))
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string());

        let mut parts: Vec<(String, String)> = vec![
            ("[Content_Types].xml".into(), templates::content_types_xml(count)),
            ("_rels/.rels".into(), templates::package_rels_xml()),
            (
                "docProps/core.xml".into(),
                templates::core_props_xml(&escape(document_title.as_str())),
            ),
            ("docProps/app.xml".into(), templates::app_props_xml(count)),
            ("ppt/presentation.xml".into(), presentation_xml(count)),
            ("ppt/_rels/presentation.xml.rels".into(), presentation_rels_xml(count)),
            ("ppt/slideMasters/slideMaster1.xml".into(), templates::slide_master_xml()),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
                templates::slide_master_rels_xml(),
            ),
            ("ppt/slideLayouts/slideLayout1.xml".into(), templates::slide_layout_xml()),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
                templates::slide_layout_rels_xml(),
            ),
            ("ppt/theme/theme1.xml".into(), templates::theme_xml()),
        ];

        for (idx, slide) in deck.iter().enumerate() {
            let number = idx + 1;
            parts.push((format!("ppt/slides/slide{}.xml", number), slide_xml(slide)));
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                templates::slide_rels_xml(),
            ));
        }

        for (path, xml) in &parts {
            zip.start_file(path.as_str(), options)
                .map_err(|e| Error::Export(format!("Failed to add '{}': {}", path, e)))?;
            zip.write_all(xml.as_bytes())
                .map_err(|e| Error::Export(format!("Failed to write '{}': {}", path, e)))?;
        }

        let sink = zip
            .finish()
            .map_err(|e| Error::Export(format!("Failed to finish ZIP: {}", e)))?;
        log::debug!("Wrote PPTX with {} slides ({} parts)", count, parts.len());

        Ok(sink)
    }
}

impl PresentationWriter for PptxWriter {
    fn build_file(&self, deck: &Deck) -> Result<Vec<u8>> {
        Ok(self.write(deck, Cursor::new(Vec::new()))?.into_inner())
    }
}

fn presentation_xml(slide_count: usize) -> String {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(templates::XML_DECLARATION);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    ));
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for idx in 0..slide_count {
        xml.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + idx,
            idx + 2
        ));
    }
    xml.push_str("</p:sldIdLst>");
    xml.push_str(&format!(
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        SLIDE_WIDTH, SLIDE_HEIGHT
    ));
    xml.push_str("</p:presentation>");
    xml
}

/// rId1 is the master, slides follow from rId2, the theme comes last.
fn presentation_rels_xml(slide_count: usize) -> String {
    let slide_rels: Vec<(String, String)> = (1..=slide_count)
        .map(|n| (format!("rId{}", n + 1), format!("slides/slide{}.xml", n)))
        .collect();
    let theme_id = format!("rId{}", slide_count + 2);

    let mut rels: Vec<(&str, &str, &str)> =
        vec![("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml")];
    rels.extend(
        slide_rels
            .iter()
            .map(|(id, target)| (id.as_str(), REL_SLIDE, target.as_str())),
    );
    rels.push((theme_id.as_str(), REL_THEME, "theme/theme1.xml"));

    templates::relationships_xml(&rels)
}

fn slide_xml(slide: &Slide) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(templates::XML_DECLARATION);
    xml.push_str(&format!(
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    ));
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(SP_TREE_HEADER);

    let title = format!(
        r#"<a:p><a:pPr algn="ctr"/>{}</a:p>"#,
        runs(&slide.title, TITLE_SIZE, TITLE_COLOR, true)
    );
    xml.push_str(&text_box(2, "Title", TITLE_FRAME, "ctr", &title));

    // one bulleted paragraph per content entry, blank entries included
    let body = if slide.content.is_empty() {
        format!(r#"<a:p>{}</a:p>"#, end_paragraph_props())
    } else {
        slide
            .content
            .iter()
            .map(|bullet| {
                format!(
                    concat!(
                        r#"<a:p><a:pPr marL="{indent}" indent="-{indent}">"#,
                        r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#,
                        "{runs}{end}</a:p>"
                    ),
                    indent = BULLET_INDENT,
                    runs = runs(bullet, BODY_SIZE, BODY_COLOR, false),
                    end = end_paragraph_props()
                )
            })
            .collect()
    };
    xml.push_str(&text_box(3, "Content", BODY_FRAME, "t", &body));

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn text_box(id: u32, name: &str, frame: Frame, anchor: &str, paragraphs: &str) -> String {
    format!(
        concat!(
            "<p:sp>",
            r#"<p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="{anchor}"><a:normAutofit/></a:bodyPr>"#,
            "<a:lstStyle/>{paragraphs}</p:txBody>",
            "</p:sp>"
        ),
        id = id,
        name = name,
        x = frame.x,
        y = frame.y,
        cx = frame.cx,
        cy = frame.cy,
        anchor = anchor,
        paragraphs = paragraphs,
    )
}

fn end_paragraph_props() -> String {
    format!(r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/>"#, BODY_SIZE)
}

/// One run per line; embedded newlines become `a:br` soft breaks.
fn runs(text: &str, size: u32, color: &str, bold: bool) -> String {
    let props = format!(
        r#"<a:rPr lang="en-US" sz="{}"{} dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr>"#,
        size,
        if bold { r#" b="1""# } else { "" },
        color
    );

    text.lines()
        .map(|line| format!("<a:r>{}<a:t>{}</a:t></a:r>", props, escape(xml_safe(line).as_str())))
        .collect::<Vec<_>>()
        .join(&format!("<a:br>{}</a:br>", props))
}

/// Drop characters XML 1.0 cannot carry.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn deck() -> Deck {
        Deck::new(vec![
            Slide::new("Intro").with_bullet("Point A").with_bullet("Point B"),
            Slide::new("Facts").with_bullet("Salt & <pepper>"),
        ])
        .unwrap()
    }

    fn read_part(bytes: &[u8], path: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_layout_geometry() {
        assert_eq!(TITLE_FRAME, Frame { x: 457_200, y: 228_600, cx: 8_229_600, cy: 914_400 });
        assert_eq!(BODY_FRAME, Frame { x: 457_200, y: 1_371_600, cx: 8_229_600, cy: 3_657_600 });
        assert_eq!(SLIDE_WIDTH, EMU_PER_INCH * 10);
    }

    #[test]
    fn test_package_parts() {
        let bytes = PptxWriter::new().build_file(&deck()).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert!(!names.contains(&"ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_slide_size_is_widescreen() {
        let bytes = PptxWriter::new().build_file(&deck()).unwrap();
        let xml = read_part(&bytes, "ppt/presentation.xml");

        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="5143500"/>"#));
        assert_eq!(xml.matches("<p:sldId ").count(), 2);
    }

    #[test]
    fn test_slide_text_is_escaped_and_styled() {
        let bytes = PptxWriter::new().build_file(&deck()).unwrap();
        let xml = read_part(&bytes, "ppt/slides/slide2.xml");

        assert!(xml.contains("<a:t>Salt &amp; &lt;pepper&gt;</a:t>"));
        assert!(xml.contains(r#"sz="3200" b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="363636"/>"#));
        assert!(xml.contains(r#"<a:buChar char="&#8226;"/>"#));
    }

    #[test]
    fn test_slide_without_bullets_has_empty_body() {
        let deck = Deck::new(vec![Slide::new("Only a title")]).unwrap();
        let bytes = PptxWriter::new().build_file(&deck).unwrap();
        let xml = read_part(&bytes, "ppt/slides/slide1.xml");

        assert!(xml.contains("<a:endParaRPr"));
        assert!(!xml.contains("buChar"));
    }

    #[test]
    fn test_every_content_entry_is_a_bullet() {
        let slide = Slide::new("Gaps")
            .with_bullet("a")
            .with_bullet("")
            .with_bullet("  ")
            .with_bullet("b");

        let xml = slide_xml(&slide);

        assert_eq!(xml.matches("<a:buChar").count(), 4);
        let a = xml.find("<a:t>a</a:t>").unwrap();
        let blank = xml.find("<a:t>  </a:t>").unwrap();
        let b = xml.find("<a:t>b</a:t>").unwrap();
        assert!(a < blank && blank < b);
    }

    #[test]
    fn test_document_title_from_first_slide() {
        let bytes = PptxWriter::new().build_file(&deck()).unwrap();
        let xml = read_part(&bytes, "docProps/core.xml");

        assert!(xml.contains("<dc:title>Intro</dc:title>"));
    }

    #[test]
    fn test_runs_split_lines_and_strip_control_chars() {
        let xml = runs("one\ntwo\u{1}", BODY_SIZE, BODY_COLOR, false);

        assert_eq!(xml.matches("<a:r>").count(), 2);
        assert_eq!(xml.matches("<a:br>").count(), 1);
        assert!(xml.contains("<a:t>two</a:t>"));
    }
}

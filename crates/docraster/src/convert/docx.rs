//! Synthetic pagination for DOCX.
//!
//! DOCX is a flow format with no fixed pages, so pages are synthesized:
//! the document's paragraphs are read in order as plain text (one line per
//! paragraph; styling, tables and embedded objects are dropped) and
//! accumulated into blocks of `lines_per_page` lines. Each full block is
//! painted as one page image; a trailing partial block becomes the final
//! page. No pagination fidelity with Word's own layout is implied.

use std::io::Read;
use std::path::Path;

use image::RgbImage;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::config::ConversionConfig;
use crate::convert::text_image;
use crate::error::ConvertError;

pub fn rasterize_docx(
    path: &Path,
    config: &ConversionConfig,
) -> Result<Vec<RgbImage>, ConvertError> {
    let _span = tracing::info_span!("convert.docx", path = %path.display()).entered();

    let file = std::fs::File::open(path).map_err(|e| ConvertError::ReadDocument {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ConvertError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

    let paragraphs = extract_paragraphs(&mut archive)?;
    debug!("DOCX parsed: {} paragraphs", paragraphs.len());

    Ok(paginate(&paragraphs, config))
}

/// Chunk paragraph lines into page images. Exactly `lines_per_page`
/// paragraphs per page; any remainder becomes a final page, even a single
/// line. Zero paragraphs produce zero pages.
fn paginate(paragraphs: &[String], config: &ConversionConfig) -> Vec<RgbImage> {
    paragraphs
        .chunks(config.lines_per_page)
        .map(|block| text_image::render_page(&block.join("\n"), config))
        .collect()
}

/// Pull one plain-text line per `w:p` out of `word/document.xml`.
///
/// Empty paragraphs count: they occupy a line on the synthetic page just
/// like a blank line in the source document.
fn extract_paragraphs<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<Vec<String>, ConvertError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ConvertError::DocxProcessing(format!("Failed to find document.xml: {}", e)))?;

    let mut xml_content = String::new();
    document_xml
        .read_to_string(&mut xml_content)
        .map_err(|e| ConvertError::DocxProcessing(format!("Failed to read document.xml: {}", e)))?;

    parse_paragraphs(&xml_content)
}

fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ConvertError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text_element = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                // Self-closing <w:p/> is an empty paragraph.
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    if in_paragraph {
                        paragraphs.push(std::mem::take(&mut current));
                        in_paragraph = false;
                    }
                }
                b"t" => in_text_element = false,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                // Only text inside a w:t run counts, so whitespace nodes
                // between elements never reach the paragraph. Run text is
                // taken verbatim; a run's leading or trailing space is part
                // of the paragraph.
                if in_paragraph && in_text_element {
                    let decoded = e.xml_content().unwrap_or_default();
                    current.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                // quick-xml emits entity and character references as separate
                // events; resolve them back into the run text.
                if in_paragraph && in_text_element {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        current.push(ch);
                    } else if let Ok(name) = e.xml_content() {
                        if let Some(text) = resolve_predefined_entity(&name) {
                            current.push_str(text);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConvertError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

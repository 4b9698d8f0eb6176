//! Shared harness for end-to-end tests.
//!
//! Provides an isolated `Ingestor` over a temp media root plus an
//! in-memory database, and builders for real DOCX and PDF fixtures.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use docraster::db::Database;
use docraster::{ConversionConfig, DocumentView, IngestError, Ingestor, MediaStore, Upload};

pub struct TestHarness {
    temp: TempDir,
    pub ingestor: Ingestor,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(ConversionConfig::default())
    }

    pub fn with_config(config: ConversionConfig) -> Self {
        init_tracing();
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let store = MediaStore::new(temp.path());
        let ingestor = Ingestor::new(config, db, store);
        Self { temp, ingestor }
    }

    pub fn media_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn ingest(&self, filename: &str, content: Vec<u8>) -> Result<DocumentView, IngestError> {
        self.ingestor.ingest(Upload {
            filename: filename.to_string(),
            title: None,
            content,
        })
    }

    pub fn page_image(&self, document_id: &str, page_number: u32) -> std::path::PathBuf {
        self.temp
            .path()
            .join(format!("pages/doc_{}_page_{}.jpg", document_id, page_number))
    }
}

/// Installs a subscriber honoring RUST_LOG so failing runs can be
/// re-run with pipeline spans visible. Safe to call from every test.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// True when poppler's pdftoppm is on PATH. PDF rendering tests skip
/// themselves on hosts without it.
pub fn have_pdftoppm() -> bool {
    std::process::Command::new("pdftoppm")
        .arg("-v")
        .output()
        .is_ok()
}

/// Builds a minimal but valid DOCX archive with one `<w:p>` per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use zip::write::SimpleFileOptions;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{}</w:body></w:document>"#,
        body
    );

    let mut archive = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    archive
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    archive.write_all(xml.as_bytes()).unwrap();
    archive.finish().unwrap().into_inner()
}

/// Builds a valid PDF with one page of Courier text per entry.
pub fn pdf_bytes(page_texts: &[&str]) -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {},
            content.into_bytes(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_texts.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::{debug, error, info_span};
use uuid::Uuid;

use crate::config::ConversionConfig;
use crate::convert::{self, FileType};
use crate::db::{document_repo, page_repo, Database};
use crate::error::ConvertError;
use crate::storage::MediaStore;

use super::error::PipelineError;

/// Rasterizes a stored document into page images and persists one page
/// record per image.
pub struct Pipeline {
    config: Arc<ConversionConfig>,
    db: Database,
    store: MediaStore,
}

impl Pipeline {
    pub fn new(config: Arc<ConversionConfig>, db: Database, store: MediaStore) -> Self {
        Self { config, db, store }
    }

    /// Processes one document by id. Looks up the record, rasterizes the
    /// source file, writes the page images and inserts their records.
    ///
    /// `total_pages` is written before the first page image, so a reader
    /// observing the document mid-run sees the final count with pages
    /// still filling in. Returns the page count on success. Does NOT
    /// clean up on failure; the ingestion boundary owns compensation.
    pub fn process_document(&self, document_id: &str) -> Result<u32, PipelineError> {
        let _span = info_span!("pipeline", document_id = %document_id).entered();

        self.run(document_id).map_err(|e| {
            error!("Processing {} failed: {}", document_id, e);
            e
        })
    }

    fn run(&self, document_id: &str) -> Result<u32, PipelineError> {
        let document = document_repo::find_by_id(&self.db, document_id)?
            .ok_or_else(|| PipelineError::DocumentNotFound(document_id.to_string()))?;

        let file_type = FileType::parse(&document.file_type)
            .ok_or_else(|| PipelineError::UnsupportedFileType(document.file_type.clone()))?;

        let pages = {
            let _step = info_span!("rasterize").entered();
            convert::rasterize(Path::new(&document.source_path), file_type, &self.config)?
        };

        let total = pages.len() as u32;
        document_repo::set_total_pages(&self.db, document_id, total)?;

        {
            let _step = info_span!("store_pages", total = total).entered();
            for (index, page) in pages.iter().enumerate() {
                let page_number = index as u32 + 1;
                self.persist_page(document_id, page_number, page)?;
            }
        }

        debug!("Processed {} ({} pages)", document_id, total);
        Ok(total)
    }

    fn persist_page(
        &self,
        document_id: &str,
        page_number: u32,
        image: &RgbImage,
    ) -> Result<(), PipelineError> {
        let jpeg = encode_jpeg(image, self.config.jpeg_quality)?;
        self.store.store_page(document_id, page_number, &jpeg)?;

        let row = page_repo::PageRow {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            page_number,
            image_path: MediaStore::page_relative_path(document_id, page_number),
        };
        page_repo::insert(&self.db, &row)?;
        Ok(())
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ConvertError> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(image)
        .map_err(|e| ConvertError::ImageEncode(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::document_repo::DocumentRow;
    use tempfile::TempDir;

    fn test_pipeline(media_root: &Path) -> (Pipeline, Database) {
        let db = Database::open_in_memory().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(ConversionConfig::default()),
            db.clone(),
            MediaStore::new(media_root),
        );
        (pipeline, db)
    }

    fn insert_document(db: &Database, id: &str, file_type: &str, source_path: &Path) {
        document_repo::insert(
            db,
            &DocumentRow {
                id: id.to_string(),
                title: "Test".to_string(),
                file_type: file_type.to_string(),
                source_path: source_path.display().to_string(),
                total_pages: 0,
                uploaded_at: "2026-01-01T00:00:00Z".to_string(),
            },
        )
        .unwrap();
    }

    fn write_docx(dir: &Path, paragraphs: &[&str]) -> std::path::PathBuf {
        use std::io::Write;
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

        let path = dir.join("test.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut archive = zip::ZipWriter::new(file);
        archive
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        archive.write_all(xml.as_bytes()).unwrap();
        archive.finish().unwrap();
        path
    }

    #[test]
    fn test_unknown_document_id_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let (pipeline, _db) = test_pipeline(tmp.path());

        let err = pipeline.process_document("missing").unwrap_err();
        assert!(matches!(err, PipelineError::DocumentNotFound(id) if id == "missing"));
    }

    #[test]
    fn test_failure_is_logged_with_document_id() {
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let tmp = TempDir::new().unwrap();
        let (pipeline, _db) = test_pipeline(tmp.path());

        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Capture(buf.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let err = pipeline.process_document("doc-gone").unwrap_err();
            assert!(matches!(err, PipelineError::DocumentNotFound(_)));
        });

        let logs = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(
            logs.contains("doc-gone"),
            "failure log misses the document id: {logs}"
        );
    }

    #[test]
    fn test_docx_run_persists_pages_and_total() {
        let tmp = TempDir::new().unwrap();
        let source = write_docx(tmp.path(), &["First paragraph", "Second paragraph"]);
        let (pipeline, db) = test_pipeline(tmp.path());
        insert_document(&db, "d1", "docx", &source);

        let total = pipeline.process_document("d1").unwrap();
        assert_eq!(total, 1);

        let document = document_repo::find_by_id(&db, "d1").unwrap().unwrap();
        assert_eq!(document.total_pages, 1);

        let pages = page_repo::list_for_document(&db, "d1").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].image_path, "pages/doc_d1_page_1.jpg");

        let image = tmp.path().join("pages/doc_d1_page_1.jpg");
        assert!(image.exists());
        // JPEG magic bytes.
        let bytes = std::fs::read(&image).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_multi_page_docx_numbers_pages_from_one() {
        let tmp = TempDir::new().unwrap();
        // 31 paragraphs at 30 per page is two pages.
        let paragraphs: Vec<String> = (0..31).map(|i| format!("Paragraph {}", i)).collect();
        let refs: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
        let source = write_docx(tmp.path(), &refs);
        let (pipeline, db) = test_pipeline(tmp.path());
        insert_document(&db, "d2", "docx", &source);

        let total = pipeline.process_document("d2").unwrap();
        assert_eq!(total, 2);

        let pages = page_repo::list_for_document(&db, "d2").unwrap();
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_missing_source_file_fails_without_pages() {
        let tmp = TempDir::new().unwrap();
        let (pipeline, db) = test_pipeline(tmp.path());
        insert_document(&db, "d3", "docx", &tmp.path().join("nowhere.docx"));

        let err = pipeline.process_document("d3").unwrap_err();
        assert!(matches!(err, PipelineError::Convert(_)));
        assert_eq!(page_repo::count_for_document(&db, "d3").unwrap(), 0);
    }

    #[test]
    fn test_corrupt_pdf_fails_without_pages() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("broken.pdf");
        std::fs::write(&source, b"not a pdf at all").unwrap();
        let (pipeline, db) = test_pipeline(tmp.path());
        insert_document(&db, "d4", "pdf", &source);

        let err = pipeline.process_document("d4").unwrap_err();
        assert!(matches!(err, PipelineError::Convert(_)));
        assert_eq!(page_repo::count_for_document(&db, "d4").unwrap(), 0);
    }

    #[test]
    fn test_jpeg_encoding_respects_image_dimensions() {
        let image = RgbImage::from_pixel(80, 110, image::Rgb([255, 255, 255]));
        let jpeg = encode_jpeg(&image, 85).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 80);
        assert_eq!(decoded.height(), 110);
    }
}

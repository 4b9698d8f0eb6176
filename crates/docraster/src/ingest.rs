//! Ingestion boundary: accept an upload, persist it, and run the
//! conversion pipeline.
//!
//! The contract is all-or-nothing: a document either ends up fully
//! processed (record, page records, page images) or leaves no trace.
//! Validation happens before any record or file is created, and a
//! pipeline failure triggers a compensating deletion of everything
//! written so far.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::ConversionConfig;
use crate::convert::FileType;
use crate::db::{document_repo, page_repo, Database};
use crate::error::IngestError;
use crate::pipeline::Pipeline;
use crate::storage::MediaStore;

/// An uploaded file, as received from the outer surface.
pub struct Upload {
    /// Original filename, including extension.
    pub filename: String,
    /// Display title. Defaults to the filename when absent.
    pub title: Option<String>,
    pub content: Vec<u8>,
}

/// A document record with its pages, in wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub total_pages: u32,
    pub uploaded_at: String,
    pub pages: Vec<PageView>,
}

/// A single page record, in wire shape. `image_path` is relative to the
/// media root.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub page_number: u32,
    pub image_path: String,
}

pub struct Ingestor {
    db: Database,
    store: MediaStore,
    pipeline: Pipeline,
}

impl Ingestor {
    pub fn new(config: ConversionConfig, db: Database, store: MediaStore) -> Self {
        let config = Arc::new(config);
        let pipeline = Pipeline::new(config, db.clone(), store.clone());
        Self {
            db,
            store,
            pipeline,
        }
    }

    /// Ingests an upload end to end: validate, persist the source file
    /// and document record, then process.
    ///
    /// Validation rejects the upload before anything is written. A
    /// processing failure deletes the document record (pages cascade)
    /// and sweeps any artifacts already on disk, then surfaces the
    /// pipeline error.
    pub fn ingest(&self, upload: Upload) -> Result<DocumentView, IngestError> {
        if upload.filename.is_empty() || upload.content.is_empty() {
            return Err(IngestError::MissingFile);
        }

        let extension = Path::new(&upload.filename)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IngestError::UnsupportedFormat(upload.filename.clone()))?;
        let file_type = FileType::from_extension(extension)
            .ok_or_else(|| IngestError::UnsupportedFormat(extension.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let title = upload.title.unwrap_or_else(|| upload.filename.clone());

        let source_path = self
            .store
            .store_source(&id, file_type.extension(), &upload.content)?;
        let inserted = document_repo::insert(
            &self.db,
            &document_repo::DocumentRow {
                id: id.clone(),
                title,
                file_type: file_type.as_str().to_string(),
                source_path: source_path.display().to_string(),
                total_pages: 0,
                uploaded_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        if let Err(e) = inserted {
            // The source file is already on disk at this point; sweep it
            // so a failed insert leaves nothing behind.
            self.sweep_artifacts(&id);
            return Err(e.into());
        }

        match self.pipeline.process_document(&id) {
            Ok(total) => {
                info!("Ingested {} as {} ({} pages)", upload.filename, id, total);
                self.document_with_pages(&id)
            }
            Err(e) => {
                error!("Processing failed for {}, rolling back: {}", id, e);
                if let Err(rollback) = self.discard(&id) {
                    // Surface the processing failure, not the rollback's.
                    error!("Rollback for {} incomplete: {}", id, rollback);
                }
                Err(IngestError::Processing(e))
            }
        }
    }

    /// Fetches a document with its pages ordered by page number.
    pub fn document_with_pages(&self, id: &str) -> Result<DocumentView, IngestError> {
        let document = document_repo::find_by_id(&self.db, id)?
            .ok_or_else(|| IngestError::DocumentNotFound(id.to_string()))?;
        let pages = page_repo::list_for_document(&self.db, id)?;
        Ok(view_of(document, pages))
    }

    /// Lists all documents, newest upload first, each with its pages.
    pub fn list_documents(&self) -> Result<Vec<DocumentView>, IngestError> {
        let documents = document_repo::list(&self.db)?;
        let mut views = Vec::with_capacity(documents.len());
        for document in documents {
            let pages = page_repo::list_for_document(&self.db, &document.id)?;
            views.push(view_of(document, pages));
        }
        Ok(views)
    }

    /// Deletes a document, its page records (via cascade) and every
    /// artifact on disk.
    pub fn delete_document(&self, id: &str) -> Result<(), IngestError> {
        if document_repo::find_by_id(&self.db, id)?.is_none() {
            return Err(IngestError::DocumentNotFound(id.to_string()));
        }
        self.discard(id)
    }

    fn discard(&self, id: &str) -> Result<(), IngestError> {
        document_repo::delete(&self.db, id)?;
        self.store.remove_document_artifacts(id)?;
        Ok(())
    }

    fn sweep_artifacts(&self, id: &str) {
        if let Err(e) = self.store.remove_document_artifacts(id) {
            error!("Artifact sweep for {} incomplete: {}", id, e);
        }
    }
}

fn view_of(
    document: document_repo::DocumentRow,
    pages: Vec<page_repo::PageRow>,
) -> DocumentView {
    DocumentView {
        id: document.id,
        title: document.title,
        file_type: document.file_type,
        total_pages: document.total_pages,
        uploaded_at: document.uploaded_at,
        pages: pages
            .into_iter()
            .map(|p| PageView {
                page_number: p.page_number,
                image_path: p.image_path,
            })
            .collect(),
    }
}

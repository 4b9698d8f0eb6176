use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocrasterError {
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

/// Rasterization failures: the source cannot be parsed or the rendering
/// backend cannot produce page images.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF '{path}': {reason}")]
    PdfParse { path: PathBuf, reason: String },

    #[error("Failed to render PDF: {0}")]
    PdfRender(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("Failed to encode page image: {0}")]
    ImageEncode(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the ingestion boundary. The first two are
/// client-facing validation rejections and happen before any record or
/// file is created.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No file provided")]
    MissingFile,

    #[error("Unsupported file type: '{0}' (only pdf and docx are accepted)")]
    UnsupportedFormat(String),

    #[error("Document processing failed: {0}")]
    Processing(#[from] crate::pipeline::PipelineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("No document with id '{0}'")]
    DocumentNotFound(String),
}

pub type Result<T> = std::result::Result<T, DocrasterError>;

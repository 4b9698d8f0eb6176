use thiserror::Error;

use crate::db::DatabaseError;
use crate::error::{ConvertError, StorageError};

/// Errors surfaced by a pipeline run. Each variant names the stage that
/// failed, so callers can distinguish a bad document from an operational
/// fault.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("database failed: {0}")]
    Database(#[from] DatabaseError),
}

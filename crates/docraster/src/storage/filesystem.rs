//! On-disk layout for source files and page images.
//!
//! All artifacts live under one media root:
//!
//! * `sources/<document_id>.<ext>` — the uploaded file, exactly one per
//!   document.
//! * `pages/doc_<document_id>_page_<n>.jpg` — rendered page images, `n`
//!   1-based. The name is a pure function of `(document_id, page_number)`,
//!   so a page artifact is recoverable by formula, not lookup. Two
//!   documents can never collide because ids are unique.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

const PAGES_DIR: &str = "pages";
const SOURCES_DIR: &str = "sources";

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic artifact filename for a page image.
    pub fn page_image_name(document_id: &str, page_number: u32) -> String {
        format!("doc_{}_page_{}.jpg", document_id, page_number)
    }

    /// Root-relative artifact path for a page image, as stored on the
    /// page record.
    pub fn page_relative_path(document_id: &str, page_number: u32) -> String {
        format!("{}/{}", PAGES_DIR, Self::page_image_name(document_id, page_number))
    }

    /// Absolute path for a root-relative artifact path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Store an encoded page image, creating the `pages/` directory as
    /// needed. Returns the absolute path written.
    pub fn store_page(
        &self,
        document_id: &str,
        page_number: u32,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.root.join(PAGES_DIR);
        ensure_directory(&dir)?;

        let path = dir.join(Self::page_image_name(document_id, page_number));
        std::fs::write(&path, content).map_err(|e| StorageError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Store an uploaded source file under `sources/<id>.<ext>`.
    pub fn store_source(
        &self,
        document_id: &str,
        extension: &str,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.root.join(SOURCES_DIR);
        ensure_directory(&dir)?;

        let path = dir.join(format!("{}.{}", document_id, extension));
        std::fs::write(&path, content).map_err(|e| StorageError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Remove every artifact belonging to a document: its source file and
    /// any page images already written. Used by the ingestion boundary's
    /// compensating deletion; missing files are not an error, since the
    /// pipeline may have failed before writing anything.
    pub fn remove_document_artifacts(&self, document_id: &str) -> Result<(), StorageError> {
        let sources = self.root.join(SOURCES_DIR);
        if let Ok(entries) = std::fs::read_dir(&sources) {
            for entry in entries.flatten() {
                if file_stem_is(&entry.path(), document_id) {
                    remove_if_present(&entry.path())?;
                }
            }
        }

        let page_prefix = format!("doc_{}_page_", document_id);
        let pages = self.root.join(PAGES_DIR);
        if let Ok(entries) = std::fs::read_dir(&pages) {
            for entry in entries.flatten() {
                let path = entry.path();
                let is_page = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&page_prefix));
                if is_page {
                    remove_if_present(&path)?;
                }
            }
        }

        Ok(())
    }
}

fn file_stem_is(path: &Path, stem: &str) -> bool {
    path.file_stem().and_then(|s| s.to_str()) == Some(stem)
}

/// Idempotent directory creation — succeeds if the directory already
/// exists.
fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}

fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::RemoveFile {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

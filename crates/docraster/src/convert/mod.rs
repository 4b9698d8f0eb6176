//! Format dispatch for document rasterization.
//!
//! `rasterize` turns a stored source file into an ordered, in-memory
//! sequence of page images. Image at index `i` corresponds to page number
//! `i + 1`; downstream code must preserve that ordering unchanged.

pub mod docx;
pub mod minifont;
pub mod pdf;
pub mod text_image;

use std::path::Path;

use image::RgbImage;

use crate::config::ConversionConfig;
use crate::error::ConvertError;

/// Accepted upload formats. Everything else is rejected at the ingestion
/// boundary before any record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    /// Case-insensitive extension match.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.extension()
    }

    /// Inverse of [`FileType::as_str`], for rows read back from the
    /// database.
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_extension(s)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rasterize a source file into page images, in source page order.
pub fn rasterize(
    path: &Path,
    file_type: FileType,
    config: &ConversionConfig,
) -> Result<Vec<RgbImage>, ConvertError> {
    match file_type {
        FileType::Pdf => pdf::rasterize_pdf(path, config),
        FileType::Docx => docx::rasterize_docx(path, config),
    }
}

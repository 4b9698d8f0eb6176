//! PDF rasterization via poppler's `pdftoppm`.
//!
//! The source is parsed with `lopdf` first so a corrupt file fails with a
//! typed error before any external tool runs, and so the parsed page count
//! can be checked against the number of images poppler actually produced.
//! Rendering itself shells out to `pdftoppm` once for the whole document;
//! the configured poppler directory is probed and silently ignored when it
//! does not exist, falling back to a plain `$PATH` lookup.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbImage;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::error::ConvertError;

/// Render every page of the PDF at the configured DPI, preserving source
/// page order.
pub fn rasterize_pdf(path: &Path, config: &ConversionConfig) -> Result<Vec<RgbImage>, ConvertError> {
    let _span = tracing::info_span!("convert.pdf", path = %path.display()).entered();

    let doc = lopdf::Document::load(path).map_err(|e| ConvertError::PdfParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let page_count = doc.get_pages().len();
    debug!("PDF parsed: {} pages", page_count);

    if page_count == 0 {
        return Ok(Vec::new());
    }

    let scratch = tempfile::tempdir()
        .map_err(|e| ConvertError::PdfRender(format!("Failed to create scratch dir: {}", e)))?;
    let prefix = scratch.path().join("page");

    let output = pdftoppm_command(config)
        .args(["-png", "-r", &config.dpi.to_string()])
        .arg(path)
        .arg(&prefix)
        .output()
        .map_err(|e| {
            ConvertError::PdfRender(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(ConvertError::PdfRender(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let rendered = collect_rendered_pages(scratch.path())?;
    if rendered.len() != page_count {
        return Err(ConvertError::PdfRender(format!(
            "pdftoppm produced {} images for a {}-page document",
            rendered.len(),
            page_count
        )));
    }

    let mut images = Vec::with_capacity(rendered.len());
    for (page_number, image_path) in rendered {
        let img = image::open(&image_path).map_err(|e| {
            ConvertError::PdfRender(format!("Failed to read rendered page {}: {}", page_number, e))
        })?;
        images.push(img.to_rgb8());
    }

    Ok(images)
}

/// Build the `pdftoppm` command. A configured poppler directory is only
/// honoured when it actually exists; otherwise resolution falls back to
/// `$PATH` and rendering itself decides success or failure.
fn pdftoppm_command(config: &ConversionConfig) -> Command {
    if let Some(dir) = &config.poppler_path {
        if dir.is_dir() {
            return Command::new(dir.join("pdftoppm"));
        }
        warn!(
            "Configured poppler path {} does not exist, falling back to $PATH",
            dir.display()
        );
    }
    Command::new("pdftoppm")
}

/// Find `page-N.png` outputs in the scratch dir and order them by page
/// number. `pdftoppm` zero-pads the suffix depending on the page count, so
/// the number is parsed rather than reconstructed.
fn collect_rendered_pages(dir: &Path) -> Result<Vec<(usize, PathBuf)>, ConvertError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ConvertError::PdfRender(format!("Failed to read scratch dir: {}", e)))?;

    let mut pages = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| ConvertError::PdfRender(format!("Failed to read scratch dir: {}", e)))?;
        let path = entry.path();
        if let Some(page_number) = page_number_of(&path) {
            pages.push((page_number, path));
        }
    }
    pages.sort_unstable_by_key(|(n, _)| *n);
    Ok(pages)
}

/// Parse the 1-based page number out of a `page-<n>.png` filename.
fn page_number_of(path: &Path) -> Option<usize> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let suffix = stem.strip_prefix("page-")?;
    suffix.parse().ok()
}

//! Conversion configuration with documented defaults.
//!
//! Every knob of the rasterizer and the text renderer lives here so the
//! layout contract (canvas size, margins, line budget) is stated in one
//! place and can be loaded from JSON alongside the rest of a deployment's
//! configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Knobs for document-to-page-image conversion.
///
/// All fields have defaults matching the production layout contract;
/// a deployment normally only ever overrides `poppler_path` or
/// `font_path`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Rendering resolution for PDF pages.
    pub dpi: u32,

    /// Paragraph lines accumulated per synthetic DOCX page.
    pub lines_per_page: usize,

    /// Canvas width for synthetic pages, in pixels.
    pub page_width: u32,

    /// Canvas height for synthetic pages, in pixels.
    pub page_height: u32,

    /// Top and left margin of the text area, in pixels. Lines past
    /// `page_height - margin` are dropped.
    pub margin: u32,

    /// Vertical advance per text line, in pixels.
    pub line_height: u32,

    /// Font size for the scalable font, in pixels.
    pub font_size: f32,

    /// Preferred scalable font file. When unset (or unloadable) a fixed
    /// list of common system font locations is probed, and failing that a
    /// built-in bitmap font is used. Font trouble never fails a page.
    pub font_path: Option<PathBuf>,

    /// Directory containing the poppler binaries (`pdftoppm`). When unset,
    /// or when the configured directory does not exist, the binary is
    /// resolved through `$PATH`.
    pub poppler_path: Option<PathBuf>,

    /// JPEG quality for stored page images.
    pub jpeg_quality: u8,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            lines_per_page: 30,
            page_width: 800,
            page_height: 1100,
            margin: 50,
            line_height: 25,
            font_size: 16.0,
            font_path: None,
            poppler_path: None,
            jpeg_quality: 85,
        }
    }
}

//! Plain-text page rendering for the synthetic-pagination path.
//!
//! Lays text onto a fixed-size white canvas with fixed margins and line
//! height. This renderer produces exactly one image per call: lines that
//! would run past the bottom margin are silently dropped — avoiding
//! overflow by chunking text beforehand is the caller's job.
//!
//! Font trouble is never an error here. The preferred scalable font is
//! loaded per page; when neither the configured font nor any of the common
//! system locations yields a usable face, a built-in bitmap font takes
//! over with degraded fidelity.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::debug;

use crate::config::ConversionConfig;
use crate::convert::minifont;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Probed when `font_path` is unset or unloadable.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:/Windows/Fonts/arial.ttf",
];

enum PageFont {
    Scalable(FontVec),
    Bitmap,
}

/// Render one block of text as a single page image.
pub fn render_page(text: &str, config: &ConversionConfig) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(config.page_width, config.page_height, WHITE);
    let font = load_font(config);

    let mut y = config.margin;
    for line in text.split('\n') {
        match &font {
            PageFont::Scalable(face) => draw_text_mut(
                &mut canvas,
                BLACK,
                config.margin as i32,
                y as i32,
                PxScale::from(config.font_size),
                face,
                line,
            ),
            PageFont::Bitmap => minifont::draw_line(&mut canvas, config.margin, y, line),
        }
        y += config.line_height;
        if y > config.page_height.saturating_sub(config.margin) {
            break;
        }
    }

    canvas
}

fn load_font(config: &ConversionConfig) -> PageFont {
    if let Some(path) = &config.font_path {
        if let Some(face) = load_font_file(path.as_path()) {
            return PageFont::Scalable(face);
        }
        debug!(
            "Configured font {} unavailable, probing system locations",
            path.display()
        );
    }
    for candidate in FONT_CANDIDATES {
        if let Some(face) = load_font_file(std::path::Path::new(candidate)) {
            return PageFont::Scalable(face);
        }
    }
    debug!("No scalable font found, using built-in bitmap font");
    PageFont::Bitmap
}

fn load_font_file(path: &std::path::Path) -> Option<FontVec> {
    let bytes = std::fs::read(path).ok()?;
    FontVec::try_from_vec(bytes).ok()
}

//! Fonts - outline glyphs when available, built-in bitmap otherwise
//!
//! Both backends answer the same two questions: how big is this text,
//! and draw it with its top-left at (x, y).

use font8x8::{UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use serde::Serialize;
use std::path::Path;

use crate::canvas::blend_pixel;

/// Bitmap glyphs are 8x8 cells.
const BITMAP_CELL: u32 = 8;

/// Upper bound on the bitmap scale factor; keeps pixel math inside `i32`.
const MAX_BITMAP_FACTOR: u32 = 1024;

/// Measured extent of rendered text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

/// Which backend ended up serving a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    Outline,
    Fallback,
}

pub struct OutlineFont {
    font: Font<'static>,
    scale: Scale,
    ascent: f32,
}

impl OutlineFont {
    /// Parse a TrueType/OpenType font and size it so one em is `size` pixels.
    pub fn from_bytes(bytes: Vec<u8>, size: u32) -> Option<Self> {
        let font = Font::try_from_vec(bytes)?;
        let units_per_em = font.units_per_em();
        if units_per_em == 0 {
            return None;
        }
        // rusttype scales by ascent - descent, not by the em square.
        let unscaled = font.v_metrics_unscaled();
        let line_units = unscaled.ascent - unscaled.descent;
        let px = size as f32 * line_units / units_per_em as f32;
        let scale = Scale::uniform(px);
        let ascent = font.v_metrics(scale).ascent;
        Some(Self { font, scale, ascent })
    }

    /// Tight pixel bounding box of the laid-out glyphs.
    fn measure(&self, text: &str) -> TextSize {
        let mut min = (i32::MAX, i32::MAX);
        let mut max = (i32::MIN, i32::MIN);
        for glyph in self.font.layout(text, self.scale, point(0.0, self.ascent)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                min = (min.0.min(bb.min.x), min.1.min(bb.min.y));
                max = (max.0.max(bb.max.x), max.1.max(bb.max.y));
            }
        }
        if min.0 > max.0 {
            return TextSize::default();
        }
        TextSize {
            width: (max.0 - min.0) as f32,
            height: (max.1 - min.1) as f32,
        }
    }

    fn draw(&self, img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>, text: &str) {
        for glyph in self.font.layout(text, self.scale, point(x, y + self.ascent)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    blend_pixel(img, gx as i32 + bb.min.x, gy as i32 + bb.min.y, color, v);
                });
            }
        }
    }
}

/// font8x8 glyphs scaled up by an integer factor.
pub struct BitmapFont {
    factor: u32,
}

impl BitmapFont {
    pub fn new(size: u32) -> Self {
        let factor = ((size as f32 / BITMAP_CELL as f32).round() as u32).clamp(1, MAX_BITMAP_FACTOR);
        Self { factor }
    }

    pub fn cell(&self) -> u32 {
        BITMAP_CELL * self.factor
    }

    fn glyph(ch: char) -> Option<[u8; 8]> {
        BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BLOCK_FONTS.get(ch))
    }

    /// Coarse size: every character occupies one full cell.
    fn measure(&self, text: &str) -> TextSize {
        let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        if count == 0 {
            return TextSize::default();
        }
        TextSize {
            width: count.saturating_mul(self.cell()) as f32,
            height: self.cell() as f32,
        }
    }

    fn draw(&self, img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>, text: &str) {
        // i64 so that huge cells or far-off origins cannot overflow.
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        let (w, h) = (i64::from(img.width()), i64::from(img.height()));
        let cell = i64::from(self.cell());
        let factor = i64::from(self.factor);
        for (i, ch) in text.chars().enumerate() {
            // Unsupported characters keep their advance but draw nothing.
            let Some(rows) = Self::glyph(ch) else { continue };
            let origin_x = x0.saturating_add((i as i64).saturating_mul(cell));
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..8i64 {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let px = origin_x.saturating_add(col * factor);
                    let py = y0.saturating_add(row as i64 * factor);
                    let (x_start, x_end) = (px.max(0), px.saturating_add(factor).min(w));
                    let (y_start, y_end) = (py.max(0), py.saturating_add(factor).min(h));
                    for dy in y_start..y_end {
                        for dx in x_start..x_end {
                            blend_pixel(img, dx as i32, dy as i32, color, 1.0);
                        }
                    }
                }
            }
        }
    }
}

pub enum GlyphFont {
    Outline(OutlineFont),
    Bitmap(BitmapFont),
}

impl GlyphFont {
    /// Load the outline font at `path`, or fall back to the bitmap font.
    pub fn load(path: &Path, size: u32) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => match OutlineFont::from_bytes(bytes, size) {
                Some(font) => return GlyphFont::Outline(font),
                None => tracing::warn!(
                    path = %path.display(),
                    "Font file is not a readable font, using built-in bitmap font"
                ),
            },
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Font file unavailable, using built-in bitmap font"
            ),
        }
        GlyphFont::Bitmap(BitmapFont::new(size))
    }

    pub fn source(&self) -> FontSource {
        match self {
            GlyphFont::Outline(_) => FontSource::Outline,
            GlyphFont::Bitmap(_) => FontSource::Fallback,
        }
    }

    pub fn measure(&self, text: &str) -> TextSize {
        match self {
            GlyphFont::Outline(font) => font.measure(text),
            GlyphFont::Bitmap(font) => font.measure(text),
        }
    }

    /// Draw with (x, y) as the top-left of the line box.
    pub fn draw(&self, img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>, text: &str) {
        match self {
            GlyphFont::Outline(font) => font.draw(img, x, y, color, text),
            GlyphFont::Bitmap(font) => font.draw(img, x, y, color, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::WHITE;

    #[test]
    fn test_missing_font_falls_back() {
        let font = GlyphFont::load(Path::new("/nonexistent/simhei.ttf"), 50);
        assert_eq!(font.source(), FontSource::Fallback);
    }

    #[test]
    fn test_garbage_font_falls_back() {
        assert!(OutlineFont::from_bytes(b"not a font".to_vec(), 50).is_none());
    }

    #[test]
    fn test_bitmap_scales_with_size() {
        assert_eq!(BitmapFont::new(50).cell(), 48);
        assert_eq!(BitmapFont::new(8).cell(), 8);
        assert_eq!(BitmapFont::new(1).cell(), 8);
    }

    #[test]
    fn test_bitmap_huge_size_does_not_overflow() {
        let font = BitmapFont::new(u32::MAX);
        assert_eq!(font.cell(), BITMAP_CELL * MAX_BITMAP_FACTOR);

        let font = GlyphFont::Bitmap(font);
        let size = font.measure(&"W".repeat(15));
        assert!(size.width.is_finite() && size.width > 0.0);

        let mut img = RgbImage::from_pixel(4, 4, WHITE);
        font.draw(&mut img, -1.0e9, 1.0e9, Rgb([0, 0, 0]), "WWW");
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_full_block_fills_its_cell() {
        let mut img = RgbImage::from_pixel(20, 20, WHITE);
        let font = GlyphFont::Bitmap(BitmapFont::new(16));
        font.draw(&mut img, 2.0, 3.0, Rgb([0, 0, 0]), "█");
        let inked = img.pixels().filter(|p| **p == Rgb([0, 0, 0])).count();
        assert_eq!(inked, 16 * 16);
        assert_eq!(*img.get_pixel(2, 3), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(17, 18), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_bitmap_measure_counts_chars() {
        let font = GlyphFont::Bitmap(BitmapFont::new(16));
        assert_eq!(font.measure("当断"), TextSize { width: 32.0, height: 16.0 });
        assert_eq!(font.measure(""), TextSize::default());
    }

    #[test]
    fn test_bitmap_draw_marks_pixels() {
        let mut img = RgbImage::from_pixel(40, 20, WHITE);
        let font = GlyphFont::Bitmap(BitmapFont::new(16));
        font.draw(&mut img, 2.0, 2.0, Rgb([0, 0, 0]), "A");
        assert!(img.pixels().any(|p| *p == Rgb([0, 0, 0])));
        // nothing drawn past the single cell
        assert!((20..40).all(|x| (0..20).all(|y| *img.get_pixel(x, y) == WHITE)));
    }

    #[test]
    fn test_bitmap_skips_unsupported_glyphs() {
        let mut img = RgbImage::from_pixel(40, 20, WHITE);
        let font = GlyphFont::Bitmap(BitmapFont::new(8));
        font.draw(&mut img, 0.0, 0.0, Rgb([0, 0, 0]), "当");
        assert!(img.pixels().all(|p| *p == WHITE));
    }
}

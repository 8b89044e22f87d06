//! Pixel operations on the decoded template buffer.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError, Rgb, RgbImage};
use std::io::Write;

use crate::region::Region;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Fill `region` with `color`, both corners included, clipped to the image.
pub fn fill_region(img: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let right = region.right.min(img.width() - 1);
    let bottom = region.bottom.min(img.height() - 1);
    for y in region.top..=bottom {
        for x in region.left..=right {
            img.put_pixel(x, y, color);
        }
    }
}

/// Blend `color` over the pixel at (x, y) with the given coverage in [0, 1].
/// Out-of-bounds coordinates are ignored.
pub fn blend_pixel(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0);
    if alpha == 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    let dst = img.get_pixel_mut(x, y);
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * alpha + dst.0[c] as f32 * inv).round() as u8;
    }
}

/// Encode as 8-bit RGB PNG.
pub fn write_png<W: Write>(img: &RgbImage, writer: W) -> Result<(), ImageError> {
    PngEncoder::new(writer).write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_region_clips_to_image() {
        let mut img = RgbImage::from_pixel(20, 10, Rgb([0, 0, 0]));
        fill_region(&mut img, &Region::new(15, 5, 40, 30), WHITE);
        assert_eq!(*img.get_pixel(15, 5), WHITE);
        assert_eq!(*img.get_pixel(19, 9), WHITE);
        assert_eq!(*img.get_pixel(14, 5), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(15, 4), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_fill_region_includes_far_corner() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        fill_region(&mut img, &Region::new(2, 3, 4, 6), WHITE);
        assert_eq!(*img.get_pixel(2, 3), WHITE);
        assert_eq!(*img.get_pixel(4, 6), WHITE);
        assert_eq!(*img.get_pixel(5, 6), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(4, 7), Rgb([0, 0, 0]));
        let filled = img.pixels().filter(|p| **p == WHITE).count();
        assert_eq!(filled, 3 * 4);
    }

    #[test]
    fn test_fill_region_outside_image_is_noop() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        fill_region(&mut img, &Region::new(20, 20, 30, 30), WHITE);
        assert!(img.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_blend_pixel() {
        let mut img = RgbImage::from_pixel(2, 2, WHITE);
        blend_pixel(&mut img, 0, 0, Rgb([0, 0, 0]), 1.0);
        blend_pixel(&mut img, 1, 0, Rgb([0, 0, 0]), 0.5);
        blend_pixel(&mut img, -1, 0, Rgb([0, 0, 0]), 1.0);
        blend_pixel(&mut img, 5, 5, Rgb([0, 0, 0]), 1.0);
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(1, 0), Rgb([128, 128, 128]));
        assert_eq!(*img.get_pixel(0, 1), WHITE);
    }

    #[test]
    fn test_write_png_decodes() {
        let img = RgbImage::from_pixel(3, 4, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        write_png(&img, &mut bytes).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (3, 4));
        assert_eq!(*decoded.get_pixel(2, 3), Rgb([10, 20, 30]));
    }
}

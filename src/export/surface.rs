//! The raster target surface an export composites onto.

use image::{Rgba, RgbaImage};

use crate::style::Color;

// ============================================================================
// Surface
// ============================================================================

/// A private `size x size` raster target for one export invocation.
///
/// Every export allocates its own surface, so overlapping invocations never
/// share pixels. The lifecycle is fixed: fill the background, composite the
/// decoded symbol over it, then consume the pixels into an artifact.
#[derive(Debug)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Allocates a transparent `size x size` surface.
    pub fn new(size: u32) -> Self {
        Self {
            pixels: RgbaImage::new(size, size),
        }
    }

    /// Edge length in pixels.
    pub fn size(&self) -> u32 {
        self.pixels.width()
    }

    /// Fills every pixel with the given color.
    ///
    /// Runs before the decoded symbol is composited, so pixels the symbol
    /// leaves transparent keep this color instead of falling through to
    /// whatever a viewer renders behind the image.
    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Composites a decoded image onto the surface at the origin.
    pub fn composite(&mut self, decoded: &RgbaImage) {
        composite_over(&mut self.pixels, decoded, 0, 0);
    }

    /// The current pixel contents.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consumes the surface, returning the composited pixel buffer.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a source image onto a destination image at the specified
/// position, with standard alpha blending (source over destination).
///
/// Source pixels that fall outside the destination are clipped.
fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let dest_width = dest.width() as i32;
    let dest_height = dest.height() as i32;

    for sy in 0..src.height() {
        for sx in 0..src.width() {
            let dx = x + sx as i32;
            let dy = y + sy as i32;

            if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
                continue;
            }

            let src_pixel = src.get_pixel(sx, sy);
            let dst_pixel = dest.get_pixel(dx as u32, dy as u32);

            let blended = alpha_blend(*src_pixel, *dst_pixel);
            dest.put_pixel(dx as u32, dy as u32, blended);
        }
    }
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================

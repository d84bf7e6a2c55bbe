//! Drawing surface.
//!
//! A thin RGBA canvas over `image::RgbaImage` with the handful of operations
//! the composers need: gradient fills, anti-aliased shape fill/stroke, soft
//! shadows, clipped image blits and PNG export. All painting is source-over
//! alpha compositing.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rayon::prelude::*;
use std::io::Cursor;

use super::geometry::{CropRect, RoundedRect};
use crate::error::{ArdoiseError, Result};

/// Largest surface side we agree to allocate.
const MAX_SIDE: u32 = 8192;

/// A straight (non-premultiplied) RGBA color with float alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    fn lerp(self, other: Color, t: f32) -> Color {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Composite `color` at `alpha` over a destination pixel.
#[inline]
fn blend(dst: &mut [u8], color: Color, alpha: f32) {
    let sa = alpha.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let channel = |s: u8, d: u8| {
        let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    dst[0] = channel(color.r, dst[0]);
    dst[1] = channel(color.g, dst[1]);
    dst[2] = channel(color.b, dst[2]);
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Gaussian-ish falloff used for shadows: 1 inside, 0 beyond `blur / 2`.
fn soft_edge(distance: f32, blur: f32) -> f32 {
    if blur <= 0.0 {
        return (0.5 - distance).clamp(0.0, 1.0);
    }
    let t = ((distance + blur / 2.0) / blur).clamp(0.0, 1.0);
    1.0 - t * t * (3.0 - 2.0 * t)
}

/// A fixed-size RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
            return Err(ArdoiseError::CanvasUnavailable(format!(
                "Cannot allocate a {}x{} surface",
                width, height
            )));
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Blend one pixel. Out-of-bounds coordinates are ignored.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        blend(&mut px.0, color, color.a * coverage);
    }

    /// Fill the whole surface with a top-to-bottom gradient.
    ///
    /// `stops` are `(offset, color)` pairs with offsets in `[0, 1]`, sorted.
    pub fn fill_vertical_gradient(&mut self, stops: &[(f32, Color)]) {
        let Some(&(_, first)) = stops.first() else {
            return;
        };
        let width = self.width() as usize;
        let height = self.height() as usize;
        let denom = (height.max(2) - 1) as f32;

        let buffer: &mut [u8] = &mut self.image;
        buffer
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let t = y as f32 / denom;
                let mut color = stops.last().map(|s| s.1).unwrap_or(first);
                if t <= stops[0].0 {
                    color = first;
                } else {
                    for pair in stops.windows(2) {
                        let ((o0, c0), (o1, c1)) = (pair[0], pair[1]);
                        if t >= o0 && t <= o1 {
                            let local = if o1 > o0 { (t - o0) / (o1 - o0) } else { 0.0 };
                            color = c0.lerp(c1, local);
                            break;
                        }
                    }
                }
                for px in row.chunks_exact_mut(4) {
                    blend(px, color, color.a);
                }
            });
    }

    /// Fill a rounded rectangle.
    pub fn fill_shape(&mut self, shape: &RoundedRect, color: Color) {
        let (x0, y0, x1, y1) = shape.pixel_bounds(1.0);
        for y in y0..y1 {
            for x in x0..x1 {
                let c = shape.coverage(x, y);
                if c > 0.0 {
                    self.blend_pixel(x, y, color, c);
                }
            }
        }
    }

    /// Stroke the outline of a rounded rectangle, centered on the edge.
    pub fn stroke_shape(&mut self, shape: &RoundedRect, color: Color, line_width: f32) {
        let (x0, y0, x1, y1) = shape.pixel_bounds(line_width / 2.0 + 1.0);
        for y in y0..y1 {
            for x in x0..x1 {
                let c = shape.stroke_coverage(x, y, line_width);
                if c > 0.0 {
                    self.blend_pixel(x, y, color, c);
                }
            }
        }
    }

    /// Paint a blurred drop shadow for a shape, offset by `(dx, dy)`.
    pub fn fill_shadow(&mut self, shape: &RoundedRect, color: Color, blur: f32, dx: f32, dy: f32) {
        let shadow = shape.translate(dx, dy);
        let (x0, y0, x1, y1) = shadow.pixel_bounds(blur);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = shadow.distance(x as f32 + 0.5, y as f32 + 0.5);
                let c = soft_edge(d, blur);
                if c > 0.0 {
                    self.blend_pixel(x, y, color, c);
                }
            }
        }
    }

    /// Fill a circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let x0 = (cx - radius - 1.0).floor() as i32;
        let x1 = (cx + radius + 1.0).ceil() as i32;
        let y0 = (cy - radius - 1.0).floor() as i32;
        let y1 = (cy + radius + 1.0).ceil() as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt() - radius;
                let c = (0.5 - d).clamp(0.0, 1.0);
                if c > 0.0 {
                    self.blend_pixel(x, y, color, c);
                }
            }
        }
    }

    /// Draw the `crop` region of `source` scaled into the box at `(x, y)`
    /// of size `width × height`, optionally clipped to a rounded shape.
    pub fn draw_image(
        &mut self,
        source: &DynamicImage,
        crop: CropRect,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        clip: Option<&RoundedRect>,
    ) {
        if width == 0 || height == 0 || source.width() == 0 || source.height() == 0 {
            return;
        }

        let sx = (crop.sx.floor().max(0.0) as u32).min(source.width() - 1);
        let sy = (crop.sy.floor().max(0.0) as u32).min(source.height() - 1);
        let sw = (crop.width.round().max(1.0) as u32).min(source.width() - sx);
        let sh = (crop.height.round().max(1.0) as u32).min(source.height() - sy);

        let scaled = source
            .crop_imm(sx, sy, sw, sh)
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgba8();

        for (px, py, pixel) in scaled.enumerate_pixels() {
            let dx = x + px as i32;
            let dy = y + py as i32;
            let coverage = clip.map(|shape| shape.coverage(dx, dy)).unwrap_or(1.0);
            if coverage <= 0.0 {
                continue;
            }
            let color = Color::rgba(pixel[0], pixel[1], pixel[2], pixel[3] as f32 / 255.0);
            self.blend_pixel(dx, dy, color, coverage);
        }
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| ArdoiseError::Encode(format!("PNG encoding failed: {}", e)))?;
        Ok(png_bytes)
    }
}

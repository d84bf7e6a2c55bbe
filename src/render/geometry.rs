//! Geometry primitives: rounded rectangles and cover-fit cropping.
//!
//! Shapes are evaluated as signed distance fields rather than tessellated
//! paths, so the same shape serves as fill, stroke and clip region with
//! anti-aliased edges.

/// A rectangle with circular corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Effective corner radius, already clamped.
    pub radius: f32,
}

impl RoundedRect {
    /// The radius is clamped to `min(radius, width / 2, height / 2)` so small
    /// shapes never get overlapping arcs.
    pub fn new(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let radius = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        Self {
            x,
            y,
            width,
            height,
            radius,
        }
    }

    /// Same shape moved by an offset.
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Signed distance from a point to the outline. Negative inside.
    pub fn distance(&self, px: f32, py: f32) -> f32 {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        let qx = (px - (self.x + half_w)).abs() - (half_w - self.radius);
        let qy = (py - (self.y + half_h)).abs() - (half_h - self.radius);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        let inside = qx.max(qy).min(0.0);
        outside + inside - self.radius
    }

    /// Fill coverage of the pixel whose top-left corner is `(px, py)`.
    #[inline]
    pub fn coverage(&self, px: i32, py: i32) -> f32 {
        let d = self.distance(px as f32 + 0.5, py as f32 + 0.5);
        (0.5 - d).clamp(0.0, 1.0)
    }

    /// Coverage of a stroke of `line_width` centered on the outline.
    #[inline]
    pub fn stroke_coverage(&self, px: i32, py: i32, line_width: f32) -> f32 {
        let d = self.distance(px as f32 + 0.5, py as f32 + 0.5);
        (0.5 - (d.abs() - line_width / 2.0)).clamp(0.0, 1.0)
    }

    /// Pixel bounds `(x0, y0, x1, y1)` grown by `margin`, end-exclusive.
    pub fn pixel_bounds(&self, margin: f32) -> (i32, i32, i32, i32) {
        (
            (self.x - margin).floor() as i32,
            (self.y - margin).floor() as i32,
            (self.x + self.width + margin).ceil() as i32,
            (self.y + self.height + margin).ceil() as i32,
        )
    }
}

/// Source region to sample when drawing an image into a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub sx: f32,
    pub sy: f32,
    pub width: f32,
    pub height: f32,
}

/// Compute the centered crop of a `source_w × source_h` image that fills a
/// `target_w × target_h` box with no letterboxing.
///
/// A relatively wider source is cropped left and right; a relatively taller
/// one top and bottom.
pub fn cover_fit_crop(source_w: f32, source_h: f32, target_w: f32, target_h: f32) -> CropRect {
    if source_w <= 0.0 || source_h <= 0.0 || target_w <= 0.0 || target_h <= 0.0 {
        return CropRect {
            sx: 0.0,
            sy: 0.0,
            width: source_w.max(0.0),
            height: source_h.max(0.0),
        };
    }

    let target_ratio = target_w / target_h;
    let source_ratio = source_w / source_h;

    if source_ratio > target_ratio {
        let width = source_h * target_ratio;
        CropRect {
            sx: (source_w - width) / 2.0,
            sy: 0.0,
            width,
            height: source_h,
        }
    } else {
        let height = source_w / target_ratio;
        CropRect {
            sx: 0.0,
            sy: (source_h - height) / 2.0,
            width: source_w,
            height,
        }
    }
}

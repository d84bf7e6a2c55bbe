//! Text measurement, layout and painting.
//!
//! Two kinds of faces implement [`Typeface`]:
//!
//! - [`BitmapFace`]: the built-in Spleen 12×24 bitmap font scaled to the
//!   requested pixel size. Always available and fully deterministic.
//! - [`TtfFace`]: a TrueType/OpenType file rendered with `ab_glyph`
//!   (anti-aliased). Configured per weight in the config file.
//!
//! Layout ([`wrap_text`]) is independent of painting: it returns positioned
//! lines that [`Surface::fill_wrapped_text`] then paints.

use ab_glyph::{Font as _, FontArc, ScaleFont};
use spleen_font::{FONT_12X24, PSF2Font};
use std::path::Path;
use std::sync::Arc;

use super::surface::{Color, Surface};
use crate::error::{ArdoiseError, Result};

/// Appended to a truncated final line.
pub const ELLIPSIS: &str = "...";

/// Something that can measure and draw a run of text at a pixel size.
pub trait Typeface: Send + Sync {
    /// Advance width of `text` at `size` pixels.
    fn measure(&self, text: &str, size: f32) -> f32;

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw(&self, surface: &mut Surface, text: &str, x: f32, y: f32, size: f32, color: Color);
}

// ============================================================================
// BITMAP FACE (Spleen)
// ============================================================================

const SPLEEN_WIDTH: usize = 12;
const SPLEEN_HEIGHT: usize = 24;

/// Built-in bitmap face. Bold is emulated by widening every lit pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFace {
    pub bold: bool,
}

impl BitmapFace {
    pub fn regular() -> Self {
        Self { bold: false }
    }

    pub fn bold() -> Self {
        Self { bold: true }
    }

    /// 12×24 glyph bitmap, row-major. Missing glyphs become a box.
    fn glyph(font: &mut PSF2Font, ch: char) -> Vec<bool> {
        let mut bitmap = vec![false; SPLEEN_WIDTH * SPLEEN_HEIGHT];
        let mut buf = [0u8; 4];
        match font.glyph_for_utf8(ch.encode_utf8(&mut buf).as_bytes()) {
            Some(glyph) => {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < SPLEEN_HEIGHT && col_x < SPLEEN_WIDTH {
                            bitmap[row_y * SPLEEN_WIDTH + col_x] = on;
                        }
                    }
                }
            }
            None => {
                for x in 2..SPLEEN_WIDTH - 2 {
                    bitmap[4 * SPLEEN_WIDTH + x] = true;
                    bitmap[(SPLEEN_HEIGHT - 5) * SPLEEN_WIDTH + x] = true;
                }
                for y in 4..SPLEEN_HEIGHT - 4 {
                    bitmap[y * SPLEEN_WIDTH + 2] = true;
                    bitmap[y * SPLEEN_WIDTH + SPLEEN_WIDTH - 3] = true;
                }
            }
        }
        bitmap
    }
}

impl Typeface for BitmapFace {
    fn measure(&self, text: &str, size: f32) -> f32 {
        let scale = size / SPLEEN_HEIGHT as f32;
        text.chars().count() as f32 * SPLEEN_WIDTH as f32 * scale
    }

    fn draw(&self, surface: &mut Surface, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let Ok(mut font) = PSF2Font::new(FONT_12X24) else {
            log::error!("Built-in bitmap font failed to load");
            return;
        };

        let scale = size / SPLEEN_HEIGHT as f32;
        let glyph_w = (SPLEEN_WIDTH as f32 * scale).ceil() as i32;
        let glyph_h = size.ceil() as i32;
        let embolden = if self.bold { (scale * 0.75).ceil() as i32 } else { 0 };
        let origin_y = y.round() as i32;

        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let bitmap = Self::glyph(&mut font, ch);
            let origin_x = (x + i as f32 * SPLEEN_WIDTH as f32 * scale).round() as i32;

            for dy in 0..glyph_h {
                let sy = ((dy as f32 / scale) as usize).min(SPLEEN_HEIGHT - 1);
                for dx in 0..glyph_w {
                    let sx = ((dx as f32 / scale) as usize).min(SPLEEN_WIDTH - 1);
                    if bitmap[sy * SPLEEN_WIDTH + sx] {
                        for extra in 0..=embolden {
                            surface.blend_pixel(origin_x + dx + extra, origin_y + dy, color, 1.0);
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// TRUETYPE FACE (ab_glyph)
// ============================================================================

/// A TrueType/OpenType face loaded at runtime.
#[derive(Clone)]
pub struct TtfFace {
    font: FontArc,
}

impl TtfFace {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| ArdoiseError::Font(format!("Invalid font data: {}", e)))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| ArdoiseError::Font(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }
}

impl Typeface for TtfFace {
    fn measure(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(size);
        text.chars()
            .map(|ch| scaled.h_advance(self.font.glyph_id(ch)))
            .sum()
    }

    fn draw(&self, surface: &mut Surface, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let scaled = self.font.as_scaled(size);
        let baseline_y = y + scaled.ascent();
        let mut caret_x = x;

        for ch in text.chars() {
            let glyph_id = self.font.glyph_id(ch);
            let advance = scaled.h_advance(glyph_id);
            let glyph = glyph_id.with_scale_and_position(size, ab_glyph::point(caret_x, baseline_y));

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let gx = px as i32 + bounds.min.x as i32;
                    let gy = py as i32 + bounds.min.y as i32;
                    surface.blend_pixel(gx, gy, color, coverage);
                });
            }
            caret_x += advance;
        }
    }
}

// ============================================================================
// FONT BOOK
// ============================================================================

/// Weight / role of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    /// Body copy
    Regular,
    /// Dish names, ribbons
    Bold,
    /// Big titles
    Display,
}

/// A face at a fixed pixel size.
#[derive(Clone)]
pub struct Font {
    face: Arc<dyn Typeface>,
    pub size: f32,
}

impl Font {
    pub fn measure(&self, text: &str) -> f32 {
        self.face.measure(text, self.size)
    }
}

/// The set of faces a render uses.
#[derive(Clone)]
pub struct FontBook {
    regular: Arc<dyn Typeface>,
    bold: Arc<dyn Typeface>,
    display: Arc<dyn Typeface>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontBook {
    /// Bitmap faces only.
    pub fn builtin() -> Self {
        Self {
            regular: Arc::new(BitmapFace::regular()),
            bold: Arc::new(BitmapFace::bold()),
            display: Arc::new(BitmapFace::bold()),
        }
    }

    /// Load TTF faces where a path is given, built-in faces elsewhere.
    /// The display face falls back to the bold face.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>, display: Option<&Path>) -> Result<Self> {
        let builtin = Self::builtin();
        let load = |path: Option<&Path>, fallback: &Arc<dyn Typeface>| -> Result<Arc<dyn Typeface>> {
            match path {
                Some(path) => {
                    log::info!("Loading font {}", path.display());
                    Ok(Arc::new(TtfFace::from_file(path)?))
                }
                None => Ok(fallback.clone()),
            }
        };

        let regular = load(regular, &builtin.regular)?;
        let bold = load(bold, &builtin.bold)?;
        let display = load(display, &bold)?;
        Ok(Self {
            regular,
            bold,
            display,
        })
    }

    pub fn font(&self, weight: Weight, size: f32) -> Font {
        let face = match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
            Weight::Display => &self.display,
        };
        Font {
            face: face.clone(),
            size,
        }
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// A laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// The line was shortened and ends with [`ELLIPSIS`].
    pub truncated: bool,
}

/// Greedy word wrap.
///
/// Words are separated by single spaces and never split. A word joins the
/// current line while `line + word + " "` measures at most `max_width`;
/// otherwise the line is flushed and the word starts the next one.
///
/// With `max_lines = Some(n)`, once a single line of budget remains every
/// remaining word goes onto that last line, which is shortened from the end
/// and suffixed with [`ELLIPSIS`] if it does not fit, even when it holds a
/// single word. At most `n` lines are returned. Empty text yields one empty line at `(x, y)`.
pub fn wrap_text(
    measure: impl Fn(&str) -> f32,
    text: &str,
    x: f32,
    y: f32,
    max_width: f32,
    line_height: f32,
    max_lines: Option<usize>,
) -> Vec<TextLine> {
    let words: Vec<&str> = text.split(' ').collect();
    let mut lines: Vec<TextLine> = Vec::new();
    let mut line = String::new();
    let mut cursor_y = y;

    let flush = |text: &str, y: f32, truncated: bool| TextLine {
        text: text.trim_end().to_string(),
        x,
        y,
        truncated,
    };

    for (n, word) in words.iter().enumerate() {
        if let Some(max) = max_lines
            && lines.len() + 1 >= max
        {
            let mut last = line.clone();
            last.push_str(&words[n..].join(" "));
            let last = last.trim_end();
            lines.push(truncate_line(&measure, last, x, cursor_y, max_width));
            return lines;
        }

        let candidate = format!("{}{} ", line, word);
        if measure(&candidate) > max_width && n > 0 {
            lines.push(flush(&line, cursor_y, false));
            cursor_y += line_height;
            line = format!("{} ", word);
        } else {
            line = candidate;
        }
    }

    match max_lines {
        Some(max) if lines.len() + 1 >= max => {
            lines.push(truncate_line(&measure, line.trim_end(), x, cursor_y, max_width))
        }
        _ => lines.push(flush(&line, cursor_y, false)),
    }
    lines
}

/// Shorten `text` one character at a time until `text + ELLIPSIS` fits.
fn truncate_line(
    measure: &impl Fn(&str) -> f32,
    text: &str,
    x: f32,
    y: f32,
    max_width: f32,
) -> TextLine {
    if measure(text) <= max_width {
        return TextLine {
            text: text.to_string(),
            x,
            y,
            truncated: false,
        };
    }

    let mut truncated = text.to_string();
    while !truncated.is_empty() && measure(&format!("{}{}", truncated, ELLIPSIS)) > max_width {
        truncated.pop();
    }
    let trimmed = truncated.trim_end();
    TextLine {
        text: format!("{}{}", trimmed, ELLIPSIS),
        x,
        y,
        truncated: true,
    }
}

impl Surface {
    /// Draw a single line with its top-left corner at `(x, y)`.
    pub fn fill_text(&mut self, font: &Font, text: &str, x: f32, y: f32, color: Color) {
        font.face.draw(self, text, x, y, font.size, color);
    }

    /// Draw a single line horizontally centered on `center_x`.
    pub fn fill_text_centered(&mut self, font: &Font, text: &str, center_x: f32, y: f32, color: Color) {
        let width = font.measure(text);
        self.fill_text(font, text, center_x - width / 2.0, y, color);
    }

    /// Wrap and draw text; returns the lines that were painted.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_wrapped_text(
        &mut self,
        font: &Font,
        text: &str,
        x: f32,
        y: f32,
        max_width: f32,
        line_height: f32,
        max_lines: Option<usize>,
        color: Color,
    ) -> Vec<TextLine> {
        let lines = wrap_text(|s| font.measure(s), text, x, y, max_width, line_height, max_lines);
        for line in &lines {
            self.fill_text(font, &line.text, line.x, line.y, color);
        }
        lines
    }
}

//! Pieces shared by the daily and weekly card composers.

use image::DynamicImage;

use super::geometry::{RoundedRect, cover_fit_crop};
use super::loader::ImageLoader;
use super::surface::{Color, Surface};
use crate::content::Dish;

/// Drop shadow parameters.
#[derive(Debug, Clone, Copy)]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
    pub offset_y: f32,
}

/// Which side of the card holds the dish photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    Left,
    Right,
}

/// Where a card ended up and what it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CardPlacement {
    pub dish_id: String,
    /// Ribbon label (daily cards only).
    pub label: Option<&'static str>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub image_side: ImageSide,
    /// `false` when the photo failed and the placeholder was drawn.
    pub image_loaded: bool,
}

pub(crate) const PLACEHOLDER: Color = Color::rgb(0xd3, 0xb8, 0x8c);
pub(crate) const TITLE_INK: Color = Color::rgb(0x43, 0x25, 0x1c);
pub(crate) const BODY_INK: Color = Color::rgb(0x6a, 0x46, 0x35);
pub(crate) const HEADLINE_INK: Color = Color::rgb(0xfd, 0xf7, 0xee);

/// Card body: shadow first, then the translucent fill.
pub(crate) fn paint_card(surface: &mut Surface, shape: &RoundedRect, fill: Color, shadow: Shadow) {
    surface.fill_shadow(shape, shadow.color, shadow.blur, 0.0, shadow.offset_y);
    surface.fill_shape(shape, fill);
}

/// Fetch a dish photo. A missing URL or a failed load yields `None`.
pub(crate) async fn load_dish_image(loader: &dyn ImageLoader, dish: &Dish) -> Option<DynamicImage> {
    let Some(url) = dish.image_url() else {
        log::debug!("Dish {} has no image", dish.id);
        return None;
    };
    match loader.load(url).await {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Image for dish {} failed: {}", dish.id, e);
            None
        }
    }
}

/// Square dish photo, cover-fit and clipped to rounded corners. Without a
/// photo only an outlined placeholder is drawn. Returns whether the photo
/// was drawn.
pub(crate) fn paint_dish_image(
    surface: &mut Surface,
    image: Option<&DynamicImage>,
    x: f32,
    y: f32,
    size: f32,
    radius: f32,
) -> bool {
    let frame = RoundedRect::new(x, y, size, size, radius);

    let Some(image) = image else {
        surface.stroke_shape(&frame, PLACEHOLDER, 3.0);
        return false;
    };

    let crop = cover_fit_crop(image.width() as f32, image.height() as f32, size, size);
    let side = size.round() as u32;
    surface.draw_image(
        image,
        crop,
        x.round() as i32,
        y.round() as i32,
        side,
        side,
        Some(&frame),
    );
    true
}

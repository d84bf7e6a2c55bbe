//! Weekly highlights composer.
//!
//! Up to [`MAX_WEEKLY_CARDS`] cards stacked in entry order. The photo side
//! alternates with the card index (even = left, odd = right); the vertical
//! position depends on the index only. Weekly cards show name and
//! description, never price or category.

use image::DynamicImage;

use super::background::{load_background, paint_background};
use super::card::{
    BODY_INK, CardPlacement, HEADLINE_INK, ImageSide, Shadow, TITLE_INK, load_dish_image,
    paint_card, paint_dish_image,
};
use super::geometry::RoundedRect;
use super::surface::{Color, Surface};
use super::text::{FontBook, Weight};
use super::{CANVAS_HEIGHT, CANVAS_WIDTH, RenderContext, Story, run_blocking};
use crate::content::{Dish, MenuKind, MenuTemplate, WeeklyHighlights};
use crate::error::Result;

/// Cards beyond this many resolved dishes are dropped.
pub const MAX_WEEKLY_CARDS: usize = 6;

const DEFAULT_TITLE: &str = "Plats de la semaine";

const CARD_WIDTH: f32 = CANVAS_WIDTH as f32 - 140.0;
const CARD_HEIGHT: f32 = 210.0;
const CARD_RADIUS: f32 = 32.0;
const FIRST_CARD_Y: f32 = 220.0;
const CARD_SPACING: f32 = 30.0;
const CARD_FILL: Color = Color::rgba(255, 250, 245, 0.93);
const CARD_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.18),
    blur: 16.0,
    offset_y: 6.0,
};

const IMAGE_SIZE: f32 = 170.0;
const IMAGE_RADIUS: f32 = 26.0;
const IMAGE_MARGIN: f32 = 26.0;

pub fn card_x() -> f32 {
    (CANVAS_WIDTH as f32 - CARD_WIDTH) / 2.0
}

pub fn card_y(index: usize) -> f32 {
    FIRST_CARD_Y + index as f32 * (CARD_HEIGHT + CARD_SPACING)
}

pub fn image_side(index: usize) -> ImageSide {
    if index % 2 == 0 {
        ImageSide::Left
    } else {
        ImageSide::Right
    }
}

/// Text column `(x, width)` for a card whose photo sits at `img_x`.
fn text_column(side: ImageSide, x: f32, img_x: f32) -> (f32, f32) {
    match side {
        ImageSide::Left => {
            let text_x = img_x + IMAGE_SIZE + 28.0;
            (text_x, x + CARD_WIDTH - 32.0 - text_x)
        }
        ImageSide::Right => {
            let text_x = x + 32.0;
            (text_x, img_x - 32.0 - text_x)
        }
    }
}

/// Render weekly highlights.
///
/// `dishes` are the resolved entries in source order (see
/// [`WeeklyHighlights::resolved_dishes`]); only the first
/// [`MAX_WEEKLY_CARDS`] are drawn.
pub async fn generate_weekly_canvas(
    weekly: &WeeklyHighlights,
    dishes: &[Dish],
    template: Option<&MenuTemplate>,
    ctx: &RenderContext,
) -> Result<Story> {
    let loader = ctx.loader.as_ref();
    let background_image = load_background(template, loader).await;

    if dishes.len() > MAX_WEEKLY_CARDS {
        log::info!(
            "Weekly {} has {} dishes, keeping the first {}",
            weekly.id,
            dishes.len(),
            MAX_WEEKLY_CARDS
        );
    }

    let mut shown = Vec::new();
    for dish in dishes.iter().take(MAX_WEEKLY_CARDS) {
        let image = load_dish_image(loader, dish).await;
        shown.push((dish.clone(), image));
    }

    let title = Some(weekly.data.title.as_str())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    let fonts = ctx.fonts.clone();
    let mut rng = ctx.rng();

    let story = run_blocking("weekly highlights paint", move || {
        let mut surface = Surface::new(CANVAS_WIDTH, CANVAS_HEIGHT)?;
        let center_x = CANVAS_WIDTH as f32 / 2.0;

        let background = paint_background(
            &mut surface,
            background_image.as_ref(),
            MenuKind::Weekly,
            &mut rng,
        );

        let title_font = fonts.font(Weight::Display, 64.0);
        surface.fill_text_centered(&title_font, &title, center_x, 70.0, HEADLINE_INK);

        let cards = shown
            .iter()
            .enumerate()
            .map(|(index, (dish, image))| {
                paint_weekly_card(&mut surface, &fonts, index, dish, image.as_ref())
            })
            .collect();

        Ok(Story {
            surface,
            background,
            cards,
        })
    })
    .await?;

    log::info!(
        "Rendered weekly highlights {} ({} card(s), {:?} background)",
        weekly.id,
        story.cards.len(),
        story.background
    );

    Ok(story)
}

fn paint_weekly_card(
    surface: &mut Surface,
    fonts: &FontBook,
    index: usize,
    dish: &Dish,
    image: Option<&DynamicImage>,
) -> CardPlacement {
    let x = card_x();
    let y = card_y(index);
    let side = image_side(index);

    let shape = RoundedRect::new(x, y, CARD_WIDTH, CARD_HEIGHT, CARD_RADIUS);
    paint_card(surface, &shape, CARD_FILL, CARD_SHADOW);

    let img_x = match side {
        ImageSide::Left => x + IMAGE_MARGIN,
        ImageSide::Right => x + CARD_WIDTH - IMAGE_MARGIN - IMAGE_SIZE,
    };
    let img_y = y + (CARD_HEIGHT - IMAGE_SIZE) / 2.0;
    let image_loaded = paint_dish_image(surface, image, img_x, img_y, IMAGE_SIZE, IMAGE_RADIUS);

    let (text_x, text_width) = text_column(side, x, img_x);
    let text_y = img_y + 10.0;

    let name_font = fonts.font(Weight::Bold, 36.0);
    surface.fill_wrapped_text(
        &name_font,
        &dish.data.title,
        text_x,
        text_y,
        text_width,
        40.0,
        Some(2),
        TITLE_INK,
    );

    let description = dish.data.description.plain_text();
    if !description.is_empty() {
        let body_font = fonts.font(Weight::Regular, 22.0);
        surface.fill_wrapped_text(
            &body_font,
            &description,
            text_x,
            text_y + 90.0,
            text_width,
            26.0,
            Some(2),
            BODY_INK,
        );
    }

    CardPlacement {
        dish_id: dish.id.clone(),
        label: None,
        x,
        y,
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
        image_side: side,
        image_loaded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_positions() {
        assert_eq!(card_y(0), 220.0);
        assert_eq!(card_y(1), 460.0);
        assert_eq!(card_y(5), 1420.0);
        assert!(card_y(MAX_WEEKLY_CARDS - 1) + CARD_HEIGHT < CANVAS_HEIGHT as f32 - 40.0);
    }

    #[test]
    fn test_image_side_alternates() {
        let sides: Vec<_> = (0..4).map(image_side).collect();
        assert_eq!(
            sides,
            vec![ImageSide::Left, ImageSide::Right, ImageSide::Left, ImageSide::Right]
        );
    }

    #[test]
    fn test_text_column_never_overlaps_image() {
        let x = card_x();

        let img_left = x + IMAGE_MARGIN;
        let (tx, tw) = text_column(ImageSide::Left, x, img_left);
        assert!(tx > img_left + IMAGE_SIZE);
        assert!(tx + tw <= x + CARD_WIDTH);

        let img_right = x + CARD_WIDTH - IMAGE_MARGIN - IMAGE_SIZE;
        let (tx, tw) = text_column(ImageSide::Right, x, img_right);
        assert!(tx >= x);
        assert!(tx + tw < img_right);
        assert_eq!(tw, 680.0);
    }
}

//! Daily menu composer.
//!
//! Three cards, one per [`Slot`], each at a fixed vertical position given by
//! the slot's index. An empty or unresolved slot leaves its gap: the cards
//! below it do not move up.
//!
//! ```text
//! y = 80    Menu du jour
//! y = 170   2024-12-20
//! y = 260   [Entrée]  photo | name, price, description
//! y = 620   [Plat]    photo | name, price, description
//! y = 980   [Dessert] photo | name, price, description
//! ```

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
use crate::content::{DailyMenu, Dish, DishMap, MenuKind, MenuTemplate, Slot, resolve};
use crate::error::Result;

const DEFAULT_TITLE: &str = "Menu du jour";

const CARD_WIDTH: f32 = CANVAS_WIDTH as f32 - 140.0;
const CARD_HEIGHT: f32 = 320.0;
const CARD_RADIUS: f32 = 40.0;
const FIRST_CARD_Y: f32 = 260.0;
const CARD_SPACING: f32 = 40.0;
const CARD_FILL: Color = Color::rgba(255, 250, 245, 0.92);
const CARD_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.2),
    blur: 18.0,
    offset_y: 8.0,
};

const RIBBON_WIDTH: f32 = 220.0;
const RIBBON_HEIGHT: f32 = 48.0;
const RIBBON_FILL: Color = Color::rgb(0xb2, 0x2a, 0x2a);
const RIBBON_INK: Color = Color::rgb(0xfb, 0xe7, 0xb5);

const IMAGE_SIZE: f32 = 230.0;
const NAME_MAX_LINES: usize = 2;
const IMAGE_RADIUS: f32 = 30.0;
const PRICE_INK: Color = Color::rgb(0xb2, 0x2a, 0x2a);

/// Left edge shared by every card.
pub fn card_x() -> f32 {
    (CANVAS_WIDTH as f32 - CARD_WIDTH) / 2.0
}

/// Top edge of the card for `slot`, whether or not the slot is filled.
pub fn card_y(slot: Slot) -> f32 {
    FIRST_CARD_Y + slot.index() as f32 * (CARD_HEIGHT + CARD_SPACING)
}

/// A filled slot with its photo already fetched.
struct DailyCard {
    slot: Slot,
    dish: Dish,
    image: Option<DynamicImage>,
}

/// Render a daily menu.
///
/// Slots with no reference, or whose reference is missing from `dishes`,
/// are skipped. Image failures degrade to placeholders; only a surface
/// allocation failure is an error.
pub async fn generate_daily_menu_canvas(
    menu: &DailyMenu,
    dishes: &DishMap,
    template: Option<&MenuTemplate>,
    ctx: &RenderContext,
) -> Result<Story> {
    let loader = ctx.loader.as_ref();
    let background_image = load_background(template, loader).await;

    let mut filled = Vec::new();
    for slot in Slot::ALL {
        let Some(dish) = resolve(menu.slot(slot), dishes) else {
            if let Some(reference) = menu.slot(slot) {
                log::debug!("{} dish {} not resolved, skipping", slot.label(), reference.id);
            }
            continue;
        };
        let image = load_dish_image(loader, dish).await;
        filled.push(DailyCard {
            slot,
            dish: dish.clone(),
            image,
        });
    }

    let title = menu
        .data
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();
    let date = menu.data.date.clone();
    let fonts = ctx.fonts.clone();
    let mut rng = ctx.rng();

    let story = run_blocking("daily menu paint", move || {
        let mut surface = Surface::new(CANVAS_WIDTH, CANVAS_HEIGHT)?;
        let center_x = CANVAS_WIDTH as f32 / 2.0;

        let background = paint_background(
            &mut surface,
            background_image.as_ref(),
            MenuKind::Daily,
            &mut rng,
        );

        let title_font = fonts.font(Weight::Display, 70.0);
        surface.fill_text_centered(&title_font, &title, center_x, 80.0, HEADLINE_INK);

        if !date.is_empty() {
            let date_font = fonts.font(Weight::Regular, 30.0);
            surface.fill_text_centered(&date_font, &date, center_x, 170.0, HEADLINE_INK);
        }

        let mut cards = Vec::with_capacity(filled.len());
        for card in &filled {
            cards.push(paint_daily_card(&mut surface, &fonts, card));
        }

        Ok(Story {
            surface,
            background,
            cards,
        })
    })
    .await?;

    log::info!(
        "Rendered daily menu {} ({} card(s), {:?} background)",
        menu.id,
        story.cards.len(),
        story.background
    );

    Ok(story)
}

fn paint_daily_card(surface: &mut Surface, fonts: &FontBook, card: &DailyCard) -> CardPlacement {
    let DailyCard { slot, dish, image } = card;
    let x = card_x();
    let y = card_y(*slot);
    let shape = RoundedRect::new(x, y, CARD_WIDTH, CARD_HEIGHT, CARD_RADIUS);
    paint_card(surface, &shape, CARD_FILL, CARD_SHADOW);

    // Ribbon straddling the top edge
    let ribbon_y = y - RIBBON_HEIGHT / 2.0;
    let ribbon = RoundedRect::new(x + 24.0, ribbon_y, RIBBON_WIDTH, RIBBON_HEIGHT, 24.0);
    surface.fill_shape(&ribbon, RIBBON_FILL);
    let ribbon_font = fonts.font(Weight::Bold, 24.0);
    let label_y = ribbon_y + (RIBBON_HEIGHT - ribbon_font.size) / 2.0;
    surface.fill_text(&ribbon_font, slot.label(), x + 42.0, label_y, RIBBON_INK);

    let img_x = x + 32.0;
    let img_y = y + (CARD_HEIGHT - IMAGE_SIZE) / 2.0;
    let image_loaded =
        paint_dish_image(surface, image.as_ref(), img_x, img_y, IMAGE_SIZE, IMAGE_RADIUS);

    let text_x = img_x + IMAGE_SIZE + 36.0;
    let text_y = img_y + 10.0;
    let text_width = x + CARD_WIDTH - 40.0 - text_x;

    let name_font = fonts.font(Weight::Bold, 30.0);
    surface.fill_wrapped_text(
        &name_font,
        &dish.data.title,
        text_x,
        text_y,
        text_width,
        34.0,
        Some(NAME_MAX_LINES),
        TITLE_INK,
    );

    if let Some(price) = dish.price_label() {
        let price_font = fonts.font(Weight::Regular, 26.0);
        surface.fill_text(&price_font, &price, text_x, text_y + 110.0, PRICE_INK);
    }

    let description = dish.data.description.plain_text();
    if !description.is_empty() {
        let body_font = fonts.font(Weight::Regular, 22.0);
        surface.fill_wrapped_text(
            &body_font,
            &description,
            text_x,
            text_y + 150.0,
            text_width,
            26.0,
            Some(3),
            BODY_INK,
        );
    }

    CardPlacement {
        dish_id: dish.id.clone(),
        label: Some(slot.label()),
        x,
        y,
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
        image_side: ImageSide::Left,
        image_loaded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_card_positions() {
        assert_eq!(card_x(), 70.0);
        assert_eq!(card_y(Slot::Starter), 260.0);
        assert_eq!(card_y(Slot::Main), 620.0);
        assert_eq!(card_y(Slot::Dessert), 980.0);
    }

    #[test]
    fn test_long_name_stays_above_price_row() {
        let fonts = FontBook::builtin();
        let font = fonts.font(Weight::Bold, 30.0);
        let name = "Filet de bar rôti au beurre blanc et agrumes confits du marché de saison";
        let lines = crate::render::text::wrap_text(
            |s| font.measure(s),
            name,
            0.0,
            0.0,
            500.0,
            34.0,
            Some(NAME_MAX_LINES),
        );

        assert_eq!(lines.len(), NAME_MAX_LINES);
        let last = &lines[NAME_MAX_LINES - 1];
        assert!(last.truncated);
        assert!(last.y + font.size <= 110.0);
    }

    #[test]
    fn test_cards_fit_on_canvas() {
        assert!(card_y(Slot::Dessert) + CARD_HEIGHT < CANVAS_HEIGHT as f32 - 40.0);
    }
}

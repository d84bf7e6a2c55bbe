//! Background composer.
//!
//! A template's background image wins when it loads. Anything else (no
//! template, no URL, download or decode failure) paints the built-in theme
//! for the tab: a three-stop vertical gradient, a gold rounded border and,
//! for the daily theme, a scatter of snow dots.

use image::DynamicImage;
use rand::Rng;

use super::geometry::{RoundedRect, cover_fit_crop};
use super::loader::ImageLoader;
use super::surface::{Color, Surface};
use crate::content::{MenuKind, MenuTemplate};

/// What ended up painted behind the cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundOutcome {
    /// The template's background image.
    Template,
    /// The built-in theme.
    Fallback,
}

const BORDER_INSET: f32 = 40.0;
const BORDER_RADIUS: f32 = 40.0;
const GOLD: Color = Color::rgb(0xf6, 0xd2, 0x7b);
const SNOW: Color = Color::rgba(255, 255, 255, 0.35);
const SNOW_DOTS: usize = 50;

fn gradient(theme: MenuKind) -> [(f32, Color); 3] {
    match theme {
        MenuKind::Daily => [
            (0.0, Color::rgb(0x91, 0x1b, 0x24)),
            (0.5, Color::rgb(0x5a, 0x10, 0x18)),
            (1.0, Color::rgb(0x12, 0x0b, 0x13)),
        ],
        MenuKind::Weekly => [
            (0.0, Color::rgb(0x3c, 0x1b, 0x1f)),
            (0.5, Color::rgb(0x28, 0x10, 0x15)),
            (1.0, Color::rgb(0x10, 0x07, 0x0b)),
        ],
    }
}

fn border_width(theme: MenuKind) -> f32 {
    match theme {
        MenuKind::Daily => 12.0,
        MenuKind::Weekly => 10.0,
    }
}

/// Fetch the template's background image. `None` (no template, no URL, or
/// a failed download) means the built-in theme gets painted.
pub async fn load_background(
    template: Option<&MenuTemplate>,
    loader: &dyn ImageLoader,
) -> Option<DynamicImage> {
    let url = template.and_then(MenuTemplate::background_url)?;
    match loader.load(url).await {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Template background failed, using built-in theme: {}", e);
            None
        }
    }
}

/// Paint the background for `theme`: the template image cover-fit over the
/// whole surface when there is one, the built-in theme otherwise.
pub fn paint_background<R: Rng>(
    surface: &mut Surface,
    image: Option<&DynamicImage>,
    theme: MenuKind,
    rng: &mut R,
) -> BackgroundOutcome {
    let Some(image) = image else {
        paint_fallback(surface, theme, rng);
        return BackgroundOutcome::Fallback;
    };

    let (width, height) = (surface.width(), surface.height());
    let crop = cover_fit_crop(
        image.width() as f32,
        image.height() as f32,
        width as f32,
        height as f32,
    );
    surface.draw_image(image, crop, 0, 0, width, height, None);
    BackgroundOutcome::Template
}

/// Paint the built-in theme. Never fails.
pub fn paint_fallback<R: Rng>(surface: &mut Surface, theme: MenuKind, rng: &mut R) {
    let width = surface.width() as f32;
    let height = surface.height() as f32;

    surface.fill_vertical_gradient(&gradient(theme));

    let border = RoundedRect::new(
        BORDER_INSET,
        BORDER_INSET,
        width - 2.0 * BORDER_INSET,
        height - 2.0 * BORDER_INSET,
        BORDER_RADIUS,
    );
    surface.stroke_shape(&border, GOLD, border_width(theme));

    if theme == MenuKind::Daily {
        for _ in 0..SNOW_DOTS {
            let x = rng.random_range(0.0..width);
            let y = rng.random_range(0.0..height);
            let r = rng.random_range(1.0..4.0);
            surface.fill_circle(x, y, r, SNOW);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArdoiseError, Result};
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    struct SolidLoader;

    #[async_trait]
    impl ImageLoader for SolidLoader {
        async fn load(&self, url: &str) -> Result<DynamicImage> {
            if url.ends_with("404.png") {
                return Err(ArdoiseError::ImageLoad("HTTP 404".to_string()));
            }
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(30, 10, Rgba([10, 200, 30, 255]))))
        }
    }

    fn template(url: Option<&str>) -> MenuTemplate {
        serde_json::from_value(json!({
            "id": "tpl",
            "data": { "name": "Noël", "background_image": url.map(|u| json!({ "url": u })) }
        }))
        .unwrap()
    }

    async fn paint(tpl: &MenuTemplate, theme: MenuKind) -> (Surface, BackgroundOutcome) {
        let mut surface = Surface::new(108, 192).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let image = load_background(Some(tpl), &SolidLoader).await;
        let outcome = paint_background(&mut surface, image.as_ref(), theme, &mut rng);
        (surface, outcome)
    }

    #[tokio::test]
    async fn test_template_image_fills_canvas() {
        let (surface, outcome) =
            paint(&template(Some("https://cdn.example/bg.png")), MenuKind::Daily).await;

        assert_eq!(outcome, BackgroundOutcome::Template);
        assert_eq!(surface.pixel(0, 0), Rgba([10, 200, 30, 255]));
        assert_eq!(surface.pixel(107, 191), Rgba([10, 200, 30, 255]));
    }

    #[tokio::test]
    async fn test_broken_template_falls_back() {
        let (surface, outcome) =
            paint(&template(Some("https://cdn.example/404.png")), MenuKind::Weekly).await;

        assert_eq!(outcome, BackgroundOutcome::Fallback);
        assert_eq!(surface.pixel(54, 0), Rgba([0x3c, 0x1b, 0x1f, 255]));
    }

    #[tokio::test]
    async fn test_template_without_image_falls_back() {
        assert!(load_background(Some(&template(None)), &SolidLoader).await.is_none());
        assert!(load_background(None, &SolidLoader).await.is_none());

        let (_, outcome) = paint(&template(None), MenuKind::Daily).await;
        assert_eq!(outcome, BackgroundOutcome::Fallback);
    }

    #[test]
    fn test_fallback_border_is_gold() {
        let mut surface = Surface::new(400, 600).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        paint_fallback(&mut surface, MenuKind::Weekly, &mut rng);
        // Left edge of the border, halfway down
        assert_eq!(surface.pixel(40, 300), Rgba([0xf6, 0xd2, 0x7b, 255]));
        // Inside the frame the gradient shows through
        assert_ne!(surface.pixel(200, 300), Rgba([0xf6, 0xd2, 0x7b, 255]));
    }

    #[test]
    fn test_snow_is_seeded() {
        let render = |seed| {
            let mut surface = Surface::new(200, 300).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            paint_fallback(&mut surface, MenuKind::Daily, &mut rng);
            surface.into_image()
        };
        assert_eq!(render(42), render(42));
        assert_ne!(render(42), render(43));
    }

    #[test]
    fn test_weekly_has_no_snow() {
        let render = |seed| {
            let mut surface = Surface::new(200, 300).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            paint_fallback(&mut surface, MenuKind::Weekly, &mut rng);
            surface.into_image()
        };
        assert_eq!(render(1), render(2));
    }
}

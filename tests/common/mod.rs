//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ardoise::ArdoiseError;
use ardoise::content::MemorySource;
use ardoise::render::{FontBook, ImageLoader, RenderContext};
use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Color of every image the stub loader hands out.
pub const STUB_PIXEL: Rgba<u8> = Rgba([20, 140, 60, 255]);

/// Serves a solid image for every URL, except those containing "404".
#[derive(Default)]
pub struct StubLoader {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ImageLoader for StubLoader {
    async fn load(&self, url: &str) -> ardoise::Result<DynamicImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("404") {
            return Err(ArdoiseError::ImageLoad(format!("HTTP 404 for {}", url)));
        }
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, STUB_PIXEL)))
    }
}

pub fn context() -> RenderContext {
    RenderContext::new(Arc::new(StubLoader::default()), FontBook::builtin()).with_snow_seed(Some(42))
}

pub fn dish_json(id: &str, title: &str, price: Option<f64>, image: Option<&str>) -> Value {
    json!({
        "id": id,
        "type": "dish",
        "data": {
            "title": title,
            "description": [
                { "type": "paragraph", "text": format!("Description de {}", title) }
            ],
            "price": price,
            "category": "plat",
            "image": image.map(|url| json!({ "url": url })).unwrap_or(json!({}))
        }
    })
}

pub fn template_json(id: &str, name: &str, applies_to: Option<&str>, background: &str) -> Value {
    json!({
        "id": id,
        "type": "menu_template",
        "data": {
            "name": name,
            "applies_to": applies_to,
            "background_image": { "url": background }
        }
    })
}

/// A small restaurant: one daily menu on 2024-12-20 with an empty starter
/// link, two weekly highlights and three templates.
pub fn restaurant() -> MemorySource {
    MemorySource::new(restaurant_documents())
}

pub fn restaurant_documents() -> Vec<Value> {
    vec![
        dish_json("veloute", "Velouté de potimarron", Some(7.5), Some("https://cdn.test/veloute.jpg")),
        dish_json("boeuf", "Bœuf bourguignon", Some(18.0), Some("https://cdn.test/boeuf.jpg")),
        dish_json("buche", "Bûche de Noël", Some(6.0), None),
        dish_json("tarte", "Tarte tatin", Some(6.5), Some("https://cdn.test/404.jpg")),
        json!({
            "id": "menu-1220",
            "type": "daily_menu",
            "data": {
                "date": "2024-12-20",
                "title": "Menu de Noël",
                "note": [],
                "starter": { "link_type": "Document" },
                "main": { "id": "boeuf", "type": "dish" },
                "dessert": { "id": "buche", "type": "dish" }
            }
        }),
        json!({
            "id": "week-49",
            "type": "weekly_highlights",
            "data": {
                "title": "Semaine 49",
                "week_start": "2024-12-02",
                "dishes": [{ "dish": { "id": "veloute" } }]
            }
        }),
        json!({
            "id": "week-51",
            "type": "weekly_highlights",
            "data": {
                "title": "",
                "week_start": "2024-12-16",
                "dishes": [
                    { "dish": { "id": "tarte" } },
                    { "dish": { "id": "ghost" } },
                    { "dish": { "id": "boeuf" }, "note": "Le classique" }
                ]
            }
        }),
        template_json("tpl-noel", "Noël", Some("daily"), "https://cdn.test/noel.jpg"),
        template_json("tpl-broken", "", Some("both"), "https://cdn.test/404-bg.jpg"),
        template_json("tpl-week", "Semaine", Some("weekly"), "https://cdn.test/week.jpg"),
    ]
}

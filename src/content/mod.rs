//! # Content Types
//!
//! Shapes of the CMS documents consumed by the renderer. Every document comes
//! back from the store as `{ "id": ..., "type": ..., "data": { ... } }`, so the
//! entities are [`Document`]s over a per-type `data` payload.
//!
//! The store is loosely typed: empty link fields arrive as objects without an
//! `id`, empty images as `{}`, rich text as arrays of blocks where only some
//! carry text. Deserialization normalises all of that into explicit
//! `Option`s so the composers never have to guess.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`query`] | Query model and the `ContentSource` trait |
//! | [`prismic`] | HTTP client for a Prismic-style REST API |
//! | [`memory`] | In-memory store (JSON fixtures, tests) |

pub mod memory;
pub mod prismic;
pub mod query;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub use memory::MemorySource;
pub use prismic::PrismicClient;
pub use query::{ContentSource, Direction, Filter, Ordering, Query};

/// Document type names as stored in the CMS.
pub const DISH_TYPE: &str = "dish";
pub const DAILY_MENU_TYPE: &str = "daily_menu";
pub const WEEKLY_HIGHLIGHTS_TYPE: &str = "weekly_highlights";
pub const MENU_TEMPLATE_TYPE: &str = "menu_template";

/// A CMS document: stable id, document type and typed payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub id: String,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    pub data: T,
}

pub type Dish = Document<DishData>;
pub type DailyMenu = Document<DailyMenuData>;
pub type WeeklyHighlights = Document<WeeklyHighlightsData>;
pub type MenuTemplate = Document<MenuTemplateData>;

/// Treat an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// REFERENCES
// ============================================================================

/// A link to another document. Only links that actually carry an id exist;
/// an empty link field deserializes to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub id: String,
}

impl Ref {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

fn link_field<'de, D>(deserializer: D) -> Result<Option<Ref>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Link {
        #[serde(default)]
        id: Option<String>,
    }

    let link = Option::<Link>::deserialize(deserializer)?;
    Ok(link
        .and_then(|l| l.id)
        .filter(|id| !id.is_empty())
        .map(Ref::new))
}

/// Resolve a reference against the dish map. Empty and dangling references
/// both resolve to `None`.
pub fn resolve<'a>(reference: Option<&Ref>, dishes: &'a DishMap) -> Option<&'a Dish> {
    reference.and_then(|r| dishes.get(&r.id))
}

// ============================================================================
// RICH TEXT
// ============================================================================

/// One block of structured rich text.
#[derive(Debug, Clone, PartialEq)]
pub enum RichTextBlock {
    /// A block carrying text (paragraph, heading, list item...).
    Text { kind: String, text: String },
    /// Anything else (image, embed...). Contributes nothing to plain text.
    Other { kind: String },
}

impl RichTextBlock {
    fn from_value(value: &Value) -> Self {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match value.get("text").and_then(Value::as_str) {
            Some(text) => RichTextBlock::Text {
                kind,
                text: text.to_string(),
            },
            None => RichTextBlock::Other { kind },
        }
    }
}

/// Ordered sequence of rich text blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichText(pub Vec<RichTextBlock>);

impl RichText {
    /// Single-paragraph rich text.
    pub fn paragraph(text: &str) -> Self {
        Self(vec![RichTextBlock::Text {
            kind: "paragraph".to_string(),
            text: text.to_string(),
        }])
    }

    /// Build from a raw JSON value. Anything that is not an array is empty.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self(items.iter().map(RichTextBlock::from_value).collect()),
            _ => Self::default(),
        }
    }

    /// Flatten to plain text: text blocks joined by single spaces.
    pub fn plain_text(&self) -> String {
        self.0
            .iter()
            .filter_map(|block| match block {
                RichTextBlock::Text { text, .. } => Some(text.as_str()),
                RichTextBlock::Other { .. } => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// Image field. The CMS sends `{}` for an empty image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageField {
    #[serde(default)]
    pub url: Option<String>,
}

fn image_url(field: &Option<ImageField>) -> Option<&str> {
    field
        .as_ref()
        .and_then(|f| f.url.as_deref())
        .filter(|url| !url.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishData {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default)]
    pub description: RichText,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default)]
    pub image: Option<ImageField>,
}

impl Dish {
    pub fn image_url(&self) -> Option<&str> {
        image_url(&self.data.image)
    }

    /// Price formatted for display, e.g. `12.50 €`.
    pub fn price_label(&self) -> Option<String> {
        self.data.price.map(|price| format!("{:.2} €", price))
    }
}

/// The three fixed positions of a daily menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Starter,
    Main,
    Dessert,
}

impl Slot {
    /// Render order.
    pub const ALL: [Slot; 3] = [Slot::Starter, Slot::Main, Slot::Dessert];

    /// Ribbon label.
    pub fn label(self) -> &'static str {
        match self {
            Slot::Starter => "Entrée",
            Slot::Main => "Plat",
            Slot::Dessert => "Dessert",
        }
    }

    /// Fixed position in the card stack.
    pub fn index(self) -> usize {
        match self {
            Slot::Starter => 0,
            Slot::Main => 1,
            Slot::Dessert => 2,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyMenuData {
    #[serde(default, deserialize_with = "nullable")]
    pub date: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub note: RichText,
    #[serde(default, deserialize_with = "link_field")]
    pub starter: Option<Ref>,
    #[serde(default, deserialize_with = "link_field")]
    pub main: Option<Ref>,
    #[serde(default, deserialize_with = "link_field")]
    pub dessert: Option<Ref>,
}

impl DailyMenu {
    pub fn slot(&self, slot: Slot) -> Option<&Ref> {
        match slot {
            Slot::Starter => self.data.starter.as_ref(),
            Slot::Main => self.data.main.as_ref(),
            Slot::Dessert => self.data.dessert.as_ref(),
        }
    }

    /// Ids referenced by the three slots, in slot order.
    pub fn referenced_ids(&self) -> Vec<String> {
        Slot::ALL
            .iter()
            .filter_map(|&slot| self.slot(slot).map(|r| r.id.clone()))
            .collect()
    }
}

/// One item of the weekly list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightEntry {
    #[serde(default, deserialize_with = "link_field")]
    pub dish: Option<Ref>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeeklyHighlightsData {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub week_end: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub dishes: Vec<HighlightEntry>,
}

impl WeeklyHighlights {
    pub fn referenced_ids(&self) -> Vec<String> {
        self.data
            .dishes
            .iter()
            .filter_map(|entry| entry.dish.as_ref().map(|r| r.id.clone()))
            .collect()
    }

    /// Resolved dishes in entry order. Unresolved entries are dropped.
    pub fn resolved_dishes(&self, dishes: &DishMap) -> Vec<Dish> {
        self.data
            .dishes
            .iter()
            .filter_map(|entry| resolve(entry.dish.as_ref(), dishes).cloned())
            .collect()
    }
}

/// Which tab a template or a render belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    Daily,
    Weekly,
}

/// Template scope as stored in the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliesTo {
    Daily,
    Weekly,
    Both,
    /// Any value this build does not know; such templates apply to no tab.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuTemplateData {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub applies_to: Option<AppliesTo>,
    #[serde(default)]
    pub background_image: Option<ImageField>,
}

impl MenuTemplate {
    pub fn background_url(&self) -> Option<&str> {
        image_url(&self.data.background_image)
    }

    /// A template without `applies_to` applies to everything.
    pub fn applies_to(&self, kind: MenuKind) -> bool {
        match (self.data.applies_to, kind) {
            (None, _) | (Some(AppliesTo::Both), _) => true,
            (Some(AppliesTo::Daily), MenuKind::Daily) => true,
            (Some(AppliesTo::Weekly), MenuKind::Weekly) => true,
            _ => false,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.data.name.is_empty() {
            "Template sans nom"
        } else {
            &self.data.name
        }
    }
}

// ============================================================================
// RESOLVED DISH MAP
// ============================================================================

/// id → Dish lookup built for a single render.
#[derive(Debug, Clone, Default)]
pub struct DishMap(HashMap<String, Dish>);

impl DishMap {
    pub fn get(&self, id: &str) -> Option<&Dish> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Dish> for DishMap {
    fn from_iter<I: IntoIterator<Item = Dish>>(iter: I) -> Self {
        Self(iter.into_iter().map(|d| (d.id.clone(), d)).collect())
    }
}

//! # Story Rendering
//!
//! Composition engine for the 1080×1920 story images.
//!
//! ## Pipeline
//!
//! ```text
//! content ──► background ──► title ──► cards (in order) ──► Surface ──► PNG
//!                 │                       │
//!                 └──── ImageLoader ◄─────┘
//! ```
//!
//! Each render owns its [`Surface`]. Images are fetched first, strictly one
//! after the other in paint order, so total latency is the sum of the loads.
//! Painting and PNG encoding are CPU-bound and run on tokio's blocking pool
//! through [`run_blocking`], never on the async workers.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`loader`] | URL → decoded image |
//! | [`geometry`] | Rounded rectangles, cover-fit crop |
//! | [`surface`] | RGBA drawing surface |
//! | [`text`] | Faces, word wrap, text painting |
//! | [`background`] | Template background or built-in theme |
//! | [`daily`] | Daily menu composer |
//! | [`weekly`] | Weekly highlights composer |

pub mod background;
pub mod card;
pub mod daily;
pub mod geometry;
pub mod loader;
pub mod surface;
pub mod text;
pub mod weekly;

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

pub use background::BackgroundOutcome;
pub use card::{CardPlacement, ImageSide};
pub use daily::generate_daily_menu_canvas;
pub use loader::{CachingLoader, HttpImageLoader, ImageLoader};
pub use surface::{Color, Surface};
pub use text::{FontBook, Weight};
pub use weekly::generate_weekly_canvas;

use crate::config::RenderConfig;
use crate::error::{ArdoiseError, Result};

/// Output width in pixels.
pub const CANVAS_WIDTH: u32 = 1080;
/// Output height in pixels.
pub const CANVAS_HEIGHT: u32 = 1920;

/// Shared resources for rendering: image loader, fonts and the snow seed.
///
/// Cheap to clone; one context can serve many concurrent renders.
#[derive(Clone)]
pub struct RenderContext {
    pub loader: Arc<dyn ImageLoader>,
    pub fonts: FontBook,
    /// Seed for the daily theme's snow. `None` draws fresh snow every time.
    pub snow_seed: Option<u64>,
}

impl RenderContext {
    pub fn new(loader: Arc<dyn ImageLoader>, fonts: FontBook) -> Self {
        Self {
            loader,
            fonts,
            snow_seed: None,
        }
    }

    pub fn with_snow_seed(mut self, seed: Option<u64>) -> Self {
        self.snow_seed = seed;
        self
    }

    /// Context for a one-shot render: images are cached only when the
    /// config asks for it.
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        Self::build(config, false)
    }

    /// Context for the long-lived server: images are cached unless the
    /// config turns caching off.
    pub fn for_server(config: &RenderConfig) -> Result<Self> {
        Self::build(config, true)
    }

    fn build(config: &RenderConfig, cache_by_default: bool) -> Result<Self> {
        let http = HttpImageLoader::new(&config.user_agent, config.image_timeout())?;
        let loader: Arc<dyn ImageLoader> = if config.caches_images(cache_by_default) {
            log::info!(
                "Caching up to {} image(s) for {:?}",
                config.cache_capacity,
                config.cache_ttl()
            );
            Arc::new(CachingLoader::new(
                http,
                config.cache_capacity,
                config.cache_ttl(),
            ))
        } else {
            Arc::new(http)
        };
        let fonts = FontBook::load(
            config.regular_font.as_deref(),
            config.bold_font.as_deref(),
            config.display_font.as_deref(),
        )?;
        Ok(Self::new(loader, fonts).with_snow_seed(config.snow_seed))
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.snow_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Run CPU-bound work on the blocking pool and wait for it.
pub async fn run_blocking<T, F>(task: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ArdoiseError::Task(format!("{}: {}", task, e)))?
}

/// A finished render plus a record of what went into it.
#[derive(Debug, Clone)]
pub struct Story {
    pub surface: Surface,
    pub background: BackgroundOutcome,
    /// Cards in paint order.
    pub cards: Vec<CardPlacement>,
}

impl Story {
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.surface.encode_png()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_blocking_returns_result() {
        assert_eq!(run_blocking("sum", || Ok(2 + 2)).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_run_blocking_leaves_async_worker() {
        let worker = std::thread::current().id();
        let painter = run_blocking("thread", || Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker, painter);
    }

    #[tokio::test]
    async fn test_run_blocking_panic_is_task_error() {
        let err = run_blocking::<(), _>("paint", || panic!("surface exploded"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArdoiseError::Task(ref m) if m.starts_with("paint")));
    }
}

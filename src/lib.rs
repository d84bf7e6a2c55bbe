//! # Ardoise - Menu Story Renderer
//!
//! Ardoise turns a restaurant's menu content, published in a headless CMS,
//! into vertical 1080×1920 PNG "stories" ready to share:
//!
//! - **Daily menu**: starter, main and dessert cards under the day's title
//! - **Weekly highlights**: up to six alternating cards
//! - **Templates**: optional background images chosen per tab
//!
//! ## Quick Start
//!
//! ```no_run
//! use ardoise::{
//!     content::MemorySource,
//!     pages::{self, PageOutcome},
//!     render::{FontBook, HttpImageLoader, RenderContext},
//! };
//! use std::{path::Path, sync::Arc, time::Duration};
//!
//! # async fn example() -> Result<(), ardoise::ArdoiseError> {
//! let source = MemorySource::from_json_file(Path::new("content.json"))?;
//! let loader = HttpImageLoader::new("ardoise", Duration::from_secs(20))?;
//! let ctx = RenderContext::new(Arc::new(loader), FontBook::builtin());
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
//! if let PageOutcome::Rendered(page) = pages::daily_page(&source, &ctx, date, None).await? {
//!     std::fs::write(&page.file.name, &page.file.bytes)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`content`] | Document model, queries, content sources |
//! | [`render`] | Story composition |
//! | [`pages`] | Fetch, pick template, render, export |
//! | [`export`] | PNG files, share or download |
//! | [`server`] | HTTP preview server |
//! | [`config`] | TOML configuration |
//! | [`error`] | Error types |

pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod pages;
pub mod render;
pub mod server;

// Re-exports for convenience
pub use error::{ArdoiseError, Result};

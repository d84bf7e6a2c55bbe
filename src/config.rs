//! TOML configuration.
//!
//! ```toml
//! [content]
//! endpoint = "https://my-restaurant.cdn.prismic.io/api/v2"
//! access_token = "..."
//! # fixture = "content.json"
//!
//! [render]
//! display_font = "/usr/share/fonts/truetype/Playfair-Bold.ttf"
//! snow_seed = 2024
//! cache_images = true   # unset: cached in `serve`, uncached elsewhere
//! cache_capacity = 32
//! cache_ttl_secs = 600
//! timeout_secs = 20
//!
//! [server]
//! listen_addr = "0.0.0.0:8080"
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ArdoiseError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub content: ContentConfig,
    pub render: RenderConfig,
    pub server: ServerConfig,
}

/// Where documents come from. A fixture file takes precedence over the
/// Prismic endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub regular_font: Option<PathBuf>,
    pub bold_font: Option<PathBuf>,
    /// Face for the story titles; falls back to the bold face.
    pub display_font: Option<PathBuf>,
    /// Fixed seed for the daily snow dots.
    pub snow_seed: Option<u64>,
    /// Keep decoded images in memory. Unset means on for the server and off
    /// for one-shot renders.
    pub cache_images: Option<bool>,
    /// Most images the cache holds at once.
    pub cache_capacity: usize,
    /// How long a cached image stays valid, in seconds.
    pub cache_ttl_secs: u64,
    /// Per-request timeout for image downloads, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            regular_font: None,
            bold_font: None,
            display_font: None,
            snow_seed: None,
            cache_images: None,
            cache_capacity: 32,
            cache_ttl_secs: 600,
            timeout_secs: 20,
            user_agent: format!("ardoise/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RenderConfig {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Whether images get cached, given what an unset `cache_images` means
    /// for this process.
    pub fn caches_images(&self, default: bool) -> bool {
        self.cache_images.unwrap_or(default)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ArdoiseError::Config(e.to_string()))
    }

    /// Load from `path`. `None` or a missing file gives the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            log::info!("No config file found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ArdoiseError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

//! Image loading.
//!
//! [`ImageLoader`] turns a URL into a fully decoded bitmap. Decoding happens
//! before the image is handed back, so a truncated or bogus payload is an
//! error here rather than a half-drawn card later.
//!
//! Loads are independent and uncached by default. [`CachingLoader`] wraps any
//! loader with a bounded URL-keyed cache for long-lived processes (the HTTP
//! server), where the same dish photos come back on every request.

use async_trait::async_trait;
use image::DynamicImage;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{ArdoiseError, Result};

/// Resolves a URL into a decoded image.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<DynamicImage>;
}

/// Reject URLs we cannot fetch before touching the network.
fn validate_url(url: &str) -> Result<reqwest::Url> {
    if url.trim().is_empty() {
        return Err(ArdoiseError::ImageLoad("Empty image URL".to_string()));
    }
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ArdoiseError::ImageLoad(format!("Invalid image URL {}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ArdoiseError::ImageLoad(format!(
            "Unsupported URL scheme '{}' in {}",
            scheme, url
        ))),
    }
}

/// Downloads images over HTTP(S) and decodes them with the `image` crate.
pub struct HttpImageLoader {
    client: reqwest::Client,
}

impl HttpImageLoader {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ArdoiseError::ImageLoad(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<DynamicImage> {
        let parsed = validate_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ArdoiseError::ImageLoad(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(ArdoiseError::ImageLoad(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArdoiseError::ImageLoad(format!("Failed to read image data: {}", e)))?;

        let image = image::load_from_memory(&bytes)
            .map_err(|e| ArdoiseError::ImageLoad(format!("Failed to decode {}: {}", url, e)))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(ArdoiseError::ImageLoad(format!("Empty image at {}", url)));
        }
        Ok(image)
    }
}

struct CachedImage {
    image: DynamicImage,
    stored_at: Instant,
    seq: u64,
}

#[derive(Default)]
struct ImageCache {
    entries: HashMap<String, CachedImage>,
    next_seq: u64,
}

impl ImageCache {
    fn fresh(&self, url: &str, ttl: Duration) -> Option<&DynamicImage> {
        self.entries
            .get(url)
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .map(|entry| &entry.image)
    }

    /// Drop expired entries, then the oldest ones until there is room for
    /// one more.
    fn make_room(&mut self, capacity: usize, ttl: Duration) {
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        while self.entries.len() >= capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(url, _)| url.clone());
            match oldest {
                Some(url) => {
                    self.entries.remove(&url);
                }
                None => break,
            }
        }
    }

    fn insert(&mut self, url: &str, image: DynamicImage) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            url.to_string(),
            CachedImage {
                image,
                stored_at: Instant::now(),
                seq,
            },
        );
    }
}

/// URL-keyed cache in front of another loader.
///
/// Holds at most `capacity` images, each for at most `ttl`; the oldest entry
/// goes first when the cache is full. Failures are not cached.
pub struct CachingLoader<L> {
    inner: L,
    capacity: usize,
    ttl: Duration,
    cache: RwLock<ImageCache>,
}

impl<L: ImageLoader> CachingLoader<L> {
    pub fn new(inner: L, capacity: usize, ttl: Duration) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            ttl,
            cache: RwLock::new(ImageCache::default()),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.cache.read().await.entries.len()
    }
}

#[async_trait]
impl<L: ImageLoader> ImageLoader for CachingLoader<L> {
    async fn load(&self, url: &str) -> Result<DynamicImage> {
        {
            let cache = self.cache.read().await;
            if let Some(image) = cache.fresh(url, self.ttl) {
                return Ok(image.clone());
            }
        }

        let image = self.inner.load(url).await?;

        {
            let mut cache = self.cache.write().await;
            cache.make_room(self.capacity, self.ttl);
            cache.insert(url, image.clone());
            log::debug!("Cached {} ({} image(s))", url, cache.entries.len());
        }

        Ok(image)
    }
}

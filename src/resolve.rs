//! Image resolution: turns encoded image references into drawable rasters.
//!
//! `ImageResolver` owns all decode and fetch concerns so the compositor only
//! sees finished [`RasterHandle`]s. Every resolution is bounded by a timeout
//! and never fails: a reference that cannot be decoded in time resolves to
//! [`Resolution::Unresolved`] and the card falls back to its plain cell.

use async_trait::async_trait;
use base64::Engine;
use futures::future::join_all;
use image::{DynamicImage, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::BingoError;
use crate::render::crop::cover_square;
use crate::render::surface::Surface;

/// A decoded image ready to draw.
#[derive(Debug, Clone)]
pub struct RasterHandle {
    image: RgbaImage,
    /// Fetched from another origin; drawing it taints the surface.
    cross_origin: bool,
}

impl RasterHandle {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: image.into_rgba8(),
            cross_origin: false,
        }
    }

    /// Mark this image as coming from a remote origin.
    pub fn with_cross_origin(mut self) -> Self {
        self.cross_origin = true;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_cross_origin(&self) -> bool {
        self.cross_origin
    }

    /// Cover-fit this image into the square at `(x, y)` with side `size`.
    ///
    /// Returns `false` when there is nothing to draw (empty image or zero size).
    pub fn draw_cover(&self, surface: &mut Surface, x: i64, y: i64, size: u32) -> bool {
        let Some(square) = cover_square(&self.image, size) else {
            return false;
        };
        surface.draw_image(&square, x, y);
        if self.cross_origin {
            surface.mark_tainted();
        }
        true
    }
}

/// Outcome of resolving one reference.
#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(Arc<RasterHandle>),
    /// Decode failed or timed out.
    Unresolved,
}

/// Decodes an opaque image reference.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, reference: &str) -> Result<RasterHandle, BingoError>;
}

/// Decoder for `data:` URIs and `http(s)://` URLs.
pub struct SourceDecoder {
    http_client: reqwest::Client,
}

impl SourceDecoder {
    pub fn new() -> Result<Self, BingoError> {
        let http_client = reqwest::Client::builder()
            .user_agent("bingocard/0.1")
            .build()
            .map_err(|e| BingoError::Image(format!("HTTP client error: {}", e)))?;
        Ok(Self { http_client })
    }

    async fn fetch(&self, url: &str) -> Result<DynamicImage, BingoError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| BingoError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(BingoError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BingoError::Image(format!("Failed to read image data: {}", e)))?;

        decode_off_thread(move || {
            image::load_from_memory(&bytes)
                .map_err(|e| BingoError::Image(format!("Failed to decode image: {}", e)))
        })
        .await
    }
}

/// Run a CPU-bound decode on the blocking pool so the resolver's timeout
/// and sibling resolutions keep running while it works.
async fn decode_off_thread<F>(decode: F) -> Result<DynamicImage, BingoError>
where
    F: FnOnce() -> Result<DynamicImage, BingoError> + Send + 'static,
{
    tokio::task::spawn_blocking(decode)
        .await
        .map_err(|e| BingoError::Image(format!("Decode task failed: {}", e)))?
}

#[async_trait]
impl ImageDecoder for SourceDecoder {
    async fn decode(&self, reference: &str) -> Result<RasterHandle, BingoError> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            let image = self.fetch(reference).await?;
            Ok(RasterHandle::new(image).with_cross_origin())
        } else {
            let uri = reference.to_string();
            let image = decode_off_thread(move || decode_data_uri(&uri)).await?;
            Ok(RasterHandle::new(image))
        }
    }
}

/// Decode a base64 data URI such as `data:image/png;base64,iVBORw0KGgo...`.
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage, BingoError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| BingoError::Image("Not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| BingoError::Image("Malformed data URI: missing ','".to_string()))?;
    if !metadata.contains(";base64") {
        return Err(BingoError::Image(
            "Only base64 data URIs are supported".to_string(),
        ));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| BingoError::Image(format!("Failed to decode base64: {}", e)))?;
    image::load_from_memory(&bytes)
        .map_err(|e| BingoError::Image(format!("Failed to decode image: {}", e)))
}

/// Images resolved for one export, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct ResolvedImages {
    images: HashMap<String, Arc<RasterHandle>>,
}

impl ResolvedImages {
    pub fn get(&self, reference: &str) -> Option<&RasterHandle> {
        self.images.get(reference).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Resolves image references with a per-image timeout.
#[derive(Clone)]
pub struct ImageResolver {
    decoder: Arc<dyn ImageDecoder>,
    timeout: Duration,
}

impl ImageResolver {
    pub fn new(decoder: Arc<dyn ImageDecoder>, timeout: Duration) -> Self {
        Self { decoder, timeout }
    }

    /// Resolve one reference. Completes on success, failure or timeout,
    /// whichever comes first.
    pub async fn resolve(&self, reference: &str) -> Resolution {
        match tokio::time::timeout(self.timeout, self.decoder.decode(reference)).await {
            Ok(Ok(handle)) => {
                debug!(
                    reference = %short_ref(reference),
                    width = handle.width(),
                    height = handle.height(),
                    "image resolved"
                );
                Resolution::Resolved(Arc::new(handle))
            }
            Ok(Err(e)) => {
                warn!(reference = %short_ref(reference), error = %e, "image failed to decode");
                Resolution::Unresolved
            }
            Err(_) => {
                warn!(
                    reference = %short_ref(reference),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "image timed out"
                );
                Resolution::Unresolved
            }
        }
    }

    /// Resolve every distinct reference concurrently and wait for all of them.
    ///
    /// Each reference is decoded once. A slow or failing reference only
    /// affects itself; unresolved references are absent from the result.
    pub async fn resolve_all<'a, I>(&self, references: I) -> ResolvedImages
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = references
            .into_iter()
            .filter(|r| seen.insert(*r))
            .collect();

        let outcomes = join_all(unique.iter().map(|reference| async move {
            (reference.to_string(), self.resolve(reference).await)
        }))
        .await;

        let images = outcomes
            .into_iter()
            .filter_map(|(reference, resolution)| match resolution {
                Resolution::Resolved(handle) => Some((reference, handle)),
                Resolution::Unresolved => None,
            })
            .collect();
        ResolvedImages { images }
    }
}

/// Data URIs are huge; log only their head.
fn short_ref(reference: &str) -> String {
    const MAX: usize = 48;
    if reference.chars().count() <= MAX {
        reference.to_string()
    } else {
        let head: String = reference.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

//! Per-row thumbnail fetching.
//!
//! A thumbnail never fails loudly: a missing URL, a timeout, a non-image
//! response or an HTTP error all come back as [`Thumbnail::Placeholder`].

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// What a list row shows in its image slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Thumbnail {
    /// A load has been requested for the row's current article.
    #[default]
    Pending,
    /// No image, or the image could not be fetched.
    Placeholder,
    /// The image was downloaded.
    Ready {
        content_type: Option<String>,
        size: usize,
    },
}

/// Downloads thumbnails with a short, fixed timeout.
pub struct ThumbnailLoader {
    http: reqwest::Client,
    timeout: Duration,
}

impl ThumbnailLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .context("failed to build thumbnail HTTP client")?;
        Ok(Self { http, timeout })
    }

    /// Fetch the image at `image_url`, degrading to the placeholder.
    pub async fn load(&self, image_url: Option<&str>) -> Thumbnail {
        let Some(url) = image_url else {
            return Thumbnail::Placeholder;
        };

        match self.try_load(url).await {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                debug!(url, error = %e, "thumbnail unavailable, using placeholder");
                Thumbnail::Placeholder
            }
        }
    }

    async fn try_load(&self, url: &str) -> Result<Thumbnail> {
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let header = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response.bytes().await?;
        if body.is_empty() {
            bail!("empty image body");
        }

        // CDNs often label images `application/octet-stream`; the bytes win
        // over the header.
        let content_type = match (sniff_image_type(&body), header) {
            (Some(sniffed), _) => Some(sniffed.to_string()),
            (None, Some(ct)) if ct.starts_with("image/") => Some(ct),
            (None, Some(ct)) => bail!("not an image: {ct}"),
            (None, None) => None,
        };

        Ok(Thumbnail::Ready {
            content_type,
            size: body.len(),
        })
    }
}

/// Identify common raster formats by their leading magic bytes.
fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

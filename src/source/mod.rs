//! Headline source abstraction layer.
//!
//! This module defines the [`HeadlineSource`] trait and the [`Article`]
//! record.  The only concrete source is [`NewsApiClient`]; the thumbnail
//! fetcher lives here too because it talks to the same outside world.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `guardian.rs`).
//! 2. Implement [`HeadlineSource`] for your client, converting the provider's
//!    payload into [`Article`] values and its failures into
//!    [`FetchError`](crate::error::FetchError).
//! 3. Add `mod guardian;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of (or alongside) `NewsApiClient`.

mod article;
mod newsapi;
mod thumbnail;

pub use article::Article;
pub use newsapi::NewsApiClient;
pub use thumbnail::{Thumbnail, ThumbnailLoader};

#[cfg(test)]
pub(crate) use article::tests::make_article;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchOutcome;

/// Trait every headline provider implements.
///
/// The worker calls [`fetch()`](HeadlineSource::fetch) from a tokio task, so
/// implementations must be [`Send`] + [`Sync`].  One call is one attempt: no
/// retries, no caching.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Human-readable label for logs and the status bar.
    fn name(&self) -> &str;

    /// Fetch the current headlines, giving up after `timeout`.
    async fn fetch(&self, timeout: Duration) -> FetchOutcome;
}

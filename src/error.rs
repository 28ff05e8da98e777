//! Failure reasons for a single headline fetch.
//!
//! Every variant is terminal for the attempt that produced it: nothing here is
//! retried, and the presenter turns the `Display` text into the popup shown
//! to the user.  Application plumbing (config, terminal setup) uses
//! [`anyhow`] instead; this enum only covers the fetch pipeline.

use thiserror::Error;

use crate::source::Article;

/// Result of one fetch: the decoded headlines in server order, or the reason
/// the attempt failed.
pub type FetchOutcome = std::result::Result<Vec<Article>, FetchError>;

/// Why a fetch did not produce a list of articles.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint URL could not be built from the configured base URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// DNS failure, refused connection, timeout, or an interrupted body.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a zero-length body.
    #[error("server returned an empty response")]
    EmptyBody,

    /// The body was not a headlines payload.
    #[error("unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),

    /// NewsAPI rejected the request and said why.
    #[error("news provider error ({code}): {message}")]
    Upstream { code: String, message: String },
}

impl FetchError {
    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidEndpoint(_) => "invalid_endpoint",
            FetchError::Transport(e) if e.is_timeout() => "timeout",
            FetchError::Transport(_) => "transport",
            FetchError::EmptyBody => "empty_body",
            FetchError::Decode(_) => "decode",
            FetchError::Upstream { .. } => "upstream",
        }
    }
}

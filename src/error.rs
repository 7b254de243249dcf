//! Error taxonomy for collectors.

use crate::tags::Tag;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    /// The tag has no listing endpoint on this site.
    #[error("undefined tag: {0}")]
    UndefinedTag(Tag),

    #[error("undefined article href")]
    UndefinedArticleHref,

    /// Sanitized body is below the quality floor. Treat as a skip.
    #[error("article too short: {chars} visible characters")]
    ArticleTooShort { chars: usize },

    /// Video pages are not re-hosted. Treat as a skip.
    #[error("article body contains video")]
    VideoContent,

    #[error("redirected with {status} to {location:?}")]
    Redirected {
        status: StatusCode,
        location: Option<String>,
    },

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unknown collector: {0}")]
    UnknownCollector(String),

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl CollectError {
    /// Whether the driver should skip the article rather than count a failure.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            CollectError::ArticleTooShort { .. } | CollectError::VideoContent
        )
    }

    /// A 3xx on a listing page usually means the page range is exhausted.
    pub fn is_redirect(&self) -> bool {
        matches!(self, CollectError::Redirected { .. })
    }
}

pub type Result<T, E = CollectError> = std::result::Result<T, E>;

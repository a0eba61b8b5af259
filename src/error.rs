//! Error types for the scraping pipeline.

use thiserror::Error;

/// Failure of a single outbound fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// URL is not a well-formed absolute URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// DNS, connect, timeout or body read failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP status {0}")]
    Status(u16),
}

impl FetchError {
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors that stop a run before any query is attempted.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("no search queries given")]
    NoQueries,

    #[error("configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

//! Errors raised while proxying a request.
//!
//! None of these escape the translator: they are rendered into a 502 response.

use axum::http::header::InvalidHeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Network failure, timeout or protocol error talking to the upstream.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// A body stream failed or exceeded its limit while being read.
    #[error("failed to read body: {0}")]
    Body(#[from] axum::Error),

    /// A header value could not be constructed.
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// The request did not complete before its deadline.
    #[error("request deadline exceeded")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// The configured upstream URL is unusable.
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

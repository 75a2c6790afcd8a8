//! Two-mode request body.
//!
//! A body is either forwarded as an untouched stream or buffered once for a
//! rewrite. Buffering consumes the stream, so every later use must go through
//! the returned `Bytes`.

use std::fmt;

use axum::body::{Body, Bytes};
use http_body::Body as _;

use crate::error::Result;

pub enum ProxyBody {
    /// No body at all.
    Empty,
    /// Inbound stream, not yet read.
    Streaming(Body),
    /// Fully materialized bytes.
    Buffered(Bytes),
}

impl ProxyBody {
    /// Wrap an inbound body, recognising bodies that are already finished.
    pub fn from_inbound(body: Body) -> Self {
        if body.is_end_stream() {
            ProxyBody::Empty
        } else {
            ProxyBody::Streaming(body)
        }
    }

    /// Read the body to completion. At most `limit` bytes are accepted.
    pub async fn buffer(self, limit: usize) -> Result<Bytes> {
        match self {
            ProxyBody::Empty => Ok(Bytes::new()),
            ProxyBody::Buffered(bytes) => Ok(bytes),
            ProxyBody::Streaming(body) => buffer_body(body, limit).await,
        }
    }

    /// Convert into a body for the upstream client. `None` means send nothing.
    pub fn into_reqwest(self) -> Option<reqwest::Body> {
        match self {
            ProxyBody::Empty => None,
            ProxyBody::Buffered(bytes) if bytes.is_empty() => None,
            ProxyBody::Buffered(bytes) => Some(reqwest::Body::from(bytes)),
            ProxyBody::Streaming(body) => Some(reqwest::Body::wrap_stream(body.into_data_stream())),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ProxyBody::Empty => true,
            ProxyBody::Buffered(bytes) => bytes.is_empty(),
            ProxyBody::Streaming(_) => false,
        }
    }
}

impl fmt::Debug for ProxyBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyBody::Empty => f.write_str("Empty"),
            ProxyBody::Streaming(_) => f.write_str("Streaming"),
            ProxyBody::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
        }
    }
}

/// Buffer a streamed body into memory, enforcing `limit`.
pub async fn buffer_body(body: Body, limit: usize) -> Result<Bytes> {
    Ok(axum::body::to_bytes(body, limit).await?)
}

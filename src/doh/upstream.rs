//! Upstream client.
//!
//! # Responsibilities
//! - Carry an [`OutboundRequest`] to its target and relay the response
//! - Stream bodies in both directions
//! - Bound every exchange with connect and total timeouts
//!
//! # Design Decisions
//! - One shared `reqwest::Client`; no retries
//! - Hop-by-hop response headers are dropped, hyper sets its own framing

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Response};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::Result;
use crate::http::body::ProxyBody;
use crate::security::headers::strip_hop_by_hop;

/// A request about to leave the gateway.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: ProxyBody,
}

/// Sends outbound requests. Implementations must not retry.
#[async_trait]
pub trait Upstream: Send + Sync + fmt::Debug {
    async fn send(&self, request: OutboundRequest) -> Result<Response<Body>>;
}

/// HTTP(S) upstream backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: OutboundRequest) -> Result<Response<Body>> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body.into_reqwest() {
            builder = builder.body(body);
        }

        let upstream = builder.send().await?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

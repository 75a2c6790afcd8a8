//! Inbound request helpers.
//!
//! # Responsibilities
//! - Reconstruct the absolute URL the client addressed
//! - Snapshot method/URL/headers for logging before the request is consumed
//!
//! # Design Decisions
//! - Behind an edge the URI is usually origin-form, so scheme and host are
//!   recovered from the URI when absolute and from the `Host` header otherwise
//! - Header snapshots join repeated values with ", "

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, Request, Uri};
use serde::Serialize;

/// Snapshot of an inbound request, safe to keep after the request is moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl RequestRecord {
    pub fn capture<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().to_string(),
            url: InboundUrl::of(request).to_string(),
            headers: header_snapshot(request.headers()),
        }
    }
}

/// The absolute URL of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUrl {
    pub scheme: String,
    pub host: String,
    pub path_and_query: String,
}

impl InboundUrl {
    pub fn of<B>(request: &Request<B>) -> Self {
        Self::from_parts(request.uri(), request.headers())
    }

    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let scheme = uri.scheme_str().unwrap_or("http").to_ascii_lowercase();
        let host = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "localhost".to_string());
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Self {
            scheme,
            host,
            path_and_query,
        }
    }

    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }
}

impl std::fmt::Display for InboundUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path_and_query)
    }
}

/// Flatten a header map into a name → value map.
pub fn header_snapshot(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut snapshot = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        snapshot.insert(name.as_str().to_string(), joined);
    }
    snapshot
}

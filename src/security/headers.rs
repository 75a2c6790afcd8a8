//! Proxy-chain and security headers.
//!
//! # Responsibilities
//! - Build the RFC 7239 style `Forwarded` value for outbound requests
//! - Render the `Strict-Transport-Security` value for responses
//! - Strip hop-by-hop headers before relaying

use axum::http::{header, HeaderMap, HeaderName};

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Headers meaningful only for a single transport hop.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Build the `Forwarded` value for a request.
///
/// `host` is the inbound request's own host; `https` tells whether the
/// inbound URL scheme was https. Proxy-chain headers take precedence.
pub fn forwarded_value(headers: &HeaderMap, host: &str, https: bool) -> String {
    let forwarded_host = joined(headers, &X_FORWARDED_HOST).unwrap_or_else(|| host.to_string());
    let forwarded_for = joined(headers, &X_FORWARDED_FOR).unwrap_or_default();
    let proto = if https { "https" } else { "http" };

    format!(
        "by={forwarded_host}; for={forwarded_for}; host={forwarded_host}; proto={proto}"
    )
}

/// Render the HSTS directive.
pub fn hsts_value(max_age_secs: u64) -> String {
    format!("max-age={max_age_secs}")
}

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
}

/// All values of a repeated header, joined with ", ".
fn joined(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

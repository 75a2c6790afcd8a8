//! Responses manufactured by the gateway itself.
//!
//! Everything else is relayed from an upstream. The only error the gateway
//! builds is 502; the pass-through signal tells an enclosing edge to carry on
//! with its own handling.

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Response, StatusCode};

/// Marker header on the pass-through signal.
pub const X_MIDDLEWARE_NEXT: HeaderName = HeaderName::from_static("x-middleware-next");

/// 502 with a plain-text diagnostic body.
pub fn bad_gateway(error: impl std::fmt::Display) -> Response<Body> {
    let mut response = Response::new(Body::from(format!("bad gateway\n{error}")));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Empty response meaning "not handled here, continue".
pub fn passthrough_signal() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    response
        .headers_mut()
        .insert(X_MIDDLEWARE_NEXT, HeaderValue::from_static("1"));
    response
}

pub fn is_passthrough_signal(response: &Response<Body>) -> bool {
    response.headers().get(X_MIDDLEWARE_NEXT).is_some_and(|v| v == "1")
}

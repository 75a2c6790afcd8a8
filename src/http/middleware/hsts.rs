//! Strict-Transport-Security injection.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};

use super::{Interceptor, Next};
use crate::config::HstsConfig;
use crate::http::body::buffer_body;
use crate::http::response::bad_gateway;
use crate::security::headers::hsts_value;

/// Adds exactly one HSTS header to every response passing through.
///
/// In buffering mode the body is read fully and the response rebuilt around
/// the bytes, so callers always get a materialized body. Otherwise the header
/// is set on the streaming response as is.
#[derive(Debug, Clone)]
pub struct Hsts {
    value: HeaderValue,
    buffer_body: bool,
}

impl Hsts {
    pub fn new(config: &HstsConfig) -> Self {
        let value = HeaderValue::try_from(hsts_value(config.max_age_secs))
            .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000"));
        Self {
            value,
            buffer_body: config.buffer_body,
        }
    }
}

impl Default for Hsts {
    fn default() -> Self {
        Self::new(&HstsConfig::default())
    }
}

#[async_trait]
impl Interceptor for Hsts {
    async fn handle(&self, request: Request<Body>, next: Next) -> Response<Body> {
        let response = next.run(request).await;
        let (parts, body) = response.into_parts();

        let mut response = if self.buffer_body {
            match buffer_body(body, usize::MAX).await {
                Ok(bytes) => Response::from_parts(parts, Body::from(bytes)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to buffer response body");
                    bad_gateway(e)
                }
            }
        } else {
            Response::from_parts(parts, body)
        };

        // insert, not append: any upstream value is replaced
        response
            .headers_mut()
            .insert(header::STRICT_TRANSPORT_SECURITY, self.value.clone());
        response
    }
}

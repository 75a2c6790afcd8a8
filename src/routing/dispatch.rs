//! Per-request path dispatch, the innermost step of the chain.
//!
//! DoH path → translator. Anything else → pass-through: relayed untouched to
//! the configured origin, or answered with the pass-through signal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use url::Url;

use super::matcher::Matcher;
use crate::doh::{DohTranslator, OutboundRequest, Upstream};
use crate::error::ProxyError;
use crate::http::body::ProxyBody;
use crate::http::middleware::Endpoint;
use crate::http::response::{bad_gateway, passthrough_signal};
use crate::observability::metrics;
use crate::security::headers::strip_hop_by_hop;

/// What happens to requests outside the DoH path.
#[derive(Debug, Clone)]
pub enum Passthrough {
    /// Return the pass-through signal.
    Signal,
    /// Relay the request unchanged to an origin.
    Origin {
        origin: Url,
        upstream: Arc<dyn Upstream>,
    },
}

impl Passthrough {
    async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let (origin, upstream) = match self {
            Passthrough::Signal => return passthrough_signal(),
            Passthrough::Origin { origin, upstream } => (origin, upstream),
        };

        let (parts, body) = request.into_parts();
        let mut url = origin.clone();
        url.set_path(parts.uri.path());
        url.set_query(parts.uri.query());

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);

        let outbound = OutboundRequest {
            method: parts.method,
            url,
            headers,
            body: ProxyBody::from_inbound(body),
        };
        match upstream.send(outbound).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Pass-through forward failed");
                bad_gateway(e)
            }
        }
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    doh_route: Box<dyn Matcher>,
    translator: DohTranslator,
    passthrough: Passthrough,
    deadline: Duration,
}

impl Dispatcher {
    pub fn new(
        doh_route: Box<dyn Matcher>,
        translator: DohTranslator,
        passthrough: Passthrough,
        deadline: Duration,
    ) -> Self {
        Self {
            doh_route,
            translator,
            passthrough,
            deadline,
        }
    }

    async fn route(&self, request: Request<Body>) -> (&'static str, Response<Body>) {
        if self.doh_route.matches(&request) {
            ("doh", self.translator.translate(request).await)
        } else {
            ("passthrough", self.passthrough.handle(request).await)
        }
    }
}

#[async_trait]
impl Endpoint for Dispatcher {
    async fn call(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().to_string();
        let uri = request.uri().clone();

        // enforced inside the chain: the 502 still flows back through every interceptor
        let routed = tokio::time::timeout(self.deadline, self.route(request)).await;
        let (route, response) = match routed {
            Ok(routed) => routed,
            Err(elapsed) => {
                tracing::error!(uri = %uri, deadline = ?self.deadline, "Request deadline exceeded");
                ("timeout", bad_gateway(ProxyError::from(elapsed)))
            }
        };

        metrics::record_request(&method, response.status().as_u16(), route, start);
        response
    }
}

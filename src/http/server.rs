//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compose the interceptor chain (Logger → HSTS → dispatch)
//! - Create the Axum router with a catch-all handler feeding the chain
//! - Wire up tower layers (trace, request ID)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::State, http::Request, response::Response, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::config::GatewayConfig;
use crate::doh::{DohTranslator, HttpUpstream, Upstream};
use crate::error::Result;
use crate::http::middleware::{Hsts, InterceptorChain, LogSink, Logger, TracingSink};
use crate::lifecycle::shutdown;
use crate::routing::{Dispatcher, ExactPathMatcher, Passthrough};

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server talking to real upstreams and logging through tracing.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let upstream = Arc::new(HttpUpstream::new(&config.upstream)?);
        Self::with_parts(config, upstream, Arc::new(TracingSink))
    }

    /// Create a server with explicit collaborators.
    pub fn with_parts(
        config: GatewayConfig,
        upstream: Arc<dyn Upstream>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let chain = build_chain(&config, upstream, sink)?;
        let router = Self::build_router(chain);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(chain: InterceptorChain) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(chain)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.endpoint,
            doh_path = %self.config.doh.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Compose the per-request chain from configuration.
pub fn build_chain(
    config: &GatewayConfig,
    upstream: Arc<dyn Upstream>,
    sink: Arc<dyn LogSink>,
) -> Result<InterceptorChain> {
    let endpoint = Url::parse(&config.upstream.endpoint)?;
    let translator = DohTranslator::new(endpoint, upstream.clone(), config.limits.max_body_bytes);

    let passthrough = match &config.passthrough.origin {
        Some(origin) => Passthrough::Origin {
            origin: Url::parse(origin)?,
            upstream,
        },
        None => Passthrough::Signal,
    };

    let dispatcher = Dispatcher::new(
        Box::new(ExactPathMatcher::new(config.doh.path.clone())),
        translator,
        passthrough,
        Duration::from_secs(config.timeouts.request_secs),
    );

    Ok(InterceptorChain::builder()
        .with(Logger::new(sink))
        .with(Hsts::new(&config.hsts))
        .build(dispatcher))
}

async fn gateway_handler(
    State(chain): State<InterceptorChain>,
    request: Request<Body>,
) -> Response {
    chain.handle(request).await
}

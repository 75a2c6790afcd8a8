//! Interceptor chain.
//!
//! # Data Flow
//! ```text
//! request → interceptor[0] → interceptor[1] → … → endpoint
//! response ← interceptor[0] ← interceptor[1] ← … ←
//! ```
//!
//! An interceptor receives the request and a [`Next`] handle for the rest of
//! the chain. `Next::run` consumes the handle, so the remainder runs at most
//! once; an interceptor that returns without calling it short-circuits.

pub mod hsts;
pub mod logger;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};

pub use hsts::Hsts;
pub use logger::{LogEvent, LogSink, Logger, TracingSink};

/// A unit of request/response processing wrapping the rest of the chain.
#[async_trait]
pub trait Interceptor: Send + Sync + fmt::Debug {
    async fn handle(&self, request: Request<Body>, next: Next) -> Response<Body>;
}

/// The innermost handler of a chain.
#[async_trait]
pub trait Endpoint: Send + Sync + fmt::Debug {
    async fn call(&self, request: Request<Body>) -> Response<Body>;
}

/// The remainder of the chain after the current interceptor.
pub struct Next {
    stack: Arc<[Arc<dyn Interceptor>]>,
    index: usize,
    endpoint: Arc<dyn Endpoint>,
}

impl Next {
    /// Run the next interceptor, or the endpoint once the stack is exhausted.
    pub async fn run(self, request: Request<Body>) -> Response<Body> {
        match self.stack.get(self.index) {
            Some(interceptor) => {
                let interceptor = Arc::clone(interceptor);
                let next = Next {
                    stack: self.stack,
                    index: self.index + 1,
                    endpoint: self.endpoint,
                };
                interceptor.handle(request, next).await
            }
            None => self.endpoint.call(request).await,
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &(self.stack.len() - self.index))
            .finish()
    }
}

/// A composed, immutable chain. Cheap to clone.
#[derive(Clone)]
pub struct InterceptorChain {
    stack: Arc<[Arc<dyn Interceptor>]>,
    endpoint: Arc<dyn Endpoint>,
}

impl InterceptorChain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let next = Next {
            stack: Arc::clone(&self.stack),
            index: 0,
            endpoint: Arc::clone(&self.endpoint),
        };
        next.run(request).await
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("stack", &self.stack)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Builds a chain; interceptors added first wrap everything added later.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ChainBuilder {
    #[must_use]
    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn build<E: Endpoint + 'static>(self, endpoint: E) -> InterceptorChain {
        InterceptorChain {
            stack: self.interceptors.into(),
            endpoint: Arc::new(endpoint),
        }
    }
}

//! Access logging interceptor.
//!
//! Emits one record before the rest of the chain runs and one after it
//! resolves, both carrying the original request's method, URL and headers.
//! Records go to an injected [`LogSink`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use serde::Serialize;

use super::{Interceptor, Next};
use crate::http::request::{header_snapshot, RequestRecord};

/// Response half of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    pub headers: BTreeMap<String, String>,
    pub status: u16,
}

/// A structured access-log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LogEvent {
    Request {
        request: RequestRecord,
    },
    Response {
        response: ResponseRecord,
        request: RequestRecord,
    },
}

impl LogEvent {
    pub fn request(&self) -> &RequestRecord {
        match self {
            LogEvent::Request { request } | LogEvent::Response { request, .. } => request,
        }
    }
}

/// Destination for access-log records.
pub trait LogSink: Send + Sync + fmt::Debug {
    fn record(&self, event: LogEvent);
}

/// Writes each record as a JSON field on the `doh_gateway::access` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, event: LogEvent) {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize access record");
                return;
            }
        };
        match event {
            LogEvent::Request { .. } => {
                tracing::info!(target: "doh_gateway::access", record = %json, "request")
            }
            LogEvent::Response { response, .. } => tracing::info!(
                target: "doh_gateway::access",
                status = response.status,
                record = %json,
                "response"
            ),
        }
    }
}

/// The logging interceptor.
#[derive(Debug, Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

#[async_trait]
impl Interceptor for Logger {
    async fn handle(&self, request: Request<Body>, next: Next) -> Response<Body> {
        let record = RequestRecord::capture(&request);
        self.sink.record(LogEvent::Request {
            request: record.clone(),
        });

        let response = next.run(request).await;

        self.sink.record(LogEvent::Response {
            response: ResponseRecord {
                headers: header_snapshot(response.headers()),
                status: response.status().as_u16(),
            },
            request: record,
        });
        response
    }
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Logger interceptor → LogSink (TracingSink) ┐
//! other modules → tracing macros            ├→ logging.rs subscriber → stdout
//! Dispatcher → metrics.rs                   → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID from tower-http travels in the logged headers
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

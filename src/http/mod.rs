//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → middleware/ (Logger → HSTS interceptors)
//!     → routing::Dispatcher (DoH translator | pass-through)
//!     → response.rs (manufactured responses), body.rs (body modes)
//!     → Send to client
//! ```

pub mod body;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use body::ProxyBody;
pub use request::{InboundUrl, RequestRecord};
pub use server::HttpServer;

//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request reaching the end of the interceptor chain
//!     → dispatch.rs (Dispatcher endpoint)
//!     → matcher.rs (is this the DoH path?)
//!     → DoH translator | pass-through
//! ```
//!
//! # Design Decisions
//! - The server sends every path here; the decision is made per request
//! - Matchers are built at startup and immutable at runtime

pub mod dispatch;
pub mod matcher;

pub use dispatch::{Dispatcher, Passthrough};
pub use matcher::{ExactPathMatcher, Matcher};

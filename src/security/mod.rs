//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → headers.rs (append Forwarded, strip hop-by-hop)
//! Outbound response:
//!     → headers.rs (HSTS directive, strip hop-by-hop)
//! ```

pub mod headers;

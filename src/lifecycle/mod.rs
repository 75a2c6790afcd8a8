//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Resolve config → init logging/metrics → build server → bind → serve
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM) → shutdown.rs broadcast → server drains → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

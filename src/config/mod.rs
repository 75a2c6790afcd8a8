//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply DOH_ENDPOINT)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to HttpServer, which passes pieces to each component
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never re-read mid-request
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    DohConfig, GatewayConfig, HstsConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PassthroughConfig, TimeoutConfig, UpstreamConfig,
};

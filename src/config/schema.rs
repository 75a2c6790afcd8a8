//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Public resolver used when no upstream endpoint is configured.
pub const DEFAULT_DOH_ENDPOINT: &str = "https://doh.pub/dns-query";

/// Path on which DoH queries are accepted.
pub const DEFAULT_DOH_PATH: &str = "/dns-query";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream DoH resolver.
    pub upstream: UpstreamConfig,

    /// DoH endpoint settings.
    pub doh: DohConfig,

    /// Handling of requests outside the DoH path.
    pub passthrough: PassthroughConfig,

    /// Strict-Transport-Security injection.
    pub hsts: HstsConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute URL of the upstream DoH endpoint.
    pub endpoint: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total upstream exchange timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_DOH_ENDPOINT.to_string(),
            connect_timeout_secs: 5,
            timeout_secs: 10,
        }
    }
}

/// DoH endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DohConfig {
    /// Exact request path that triggers translation.
    pub path: String,
}

impl Default for DohConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DOH_PATH.to_string(),
        }
    }
}

/// Pass-through configuration for non-DoH paths.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Origin that receives untouched requests (e.g. "http://127.0.0.1:3000").
    /// When unset the pass-through signal response is returned instead.
    pub origin: Option<String>,
}

/// HSTS header injection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HstsConfig {
    /// `max-age` directive in seconds.
    pub max_age_secs: u64,

    /// Materialize the whole response body before rewriting headers.
    /// Disabling keeps responses streaming.
    pub buffer_body: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 31_536_000,
            buffer_body: true,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest POST body buffered for GET translation.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            // RFC 8484 caps a DNS message at 65535 octets
            max_body_bytes: 65_535,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

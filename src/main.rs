//! DNS-over-HTTPS edge gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   DOH GATEWAY                     │
//!   Client Request     │  ┌────────┐   ┌──────┐   ┌────────────┐          │
//!   ───────────────────┼─▶│ Logger │──▶│ HSTS │──▶│ Dispatcher │          │
//!                      │  └────────┘   └──────┘   └─────┬──────┘          │
//!                      │                   /dns-query   │   other paths   │
//!                      │                 ┌──────────────┴──────────┐      │
//!                      │                 ▼                         ▼      │
//!                      │          ┌────────────┐           ┌────────────┐ │
//!                      │          │    DoH     │           │ pass-      │ │
//!                      │          │ translator │           │ through    │ │
//!                      │          └─────┬──────┘           └────────────┘ │
//!                      └────────────────┼─────────────────────────────────┘
//!                                       ▼
//!                              upstream DoH resolver
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use doh_gateway::config::{resolve_config, validation::validate_config, ConfigError};
use doh_gateway::lifecycle::{signals, Shutdown};
use doh_gateway::observability::{logging, metrics};
use doh_gateway::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "doh-gateway")]
#[command(about = "Edge gateway forwarding DNS-over-HTTPS queries to an upstream resolver", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the upstream DoH endpoint (takes precedence over DOH_ENDPOINT).
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = resolve_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.endpoint = upstream;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability).context("failed to initialize logging")?;

    tracing::info!("doh-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.endpoint,
        upstream_timeout_secs = config.upstream.timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .context("invalid metrics address")?;
        metrics::init_metrics(addr).context("failed to start metrics endpoint")?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listener.bind_address))?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use doh_gateway::{GatewayConfig, HttpServer, Shutdown};

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Captures = Arc<Mutex<Vec<Captured>>>;

/// Start a mock upstream that records every request and answers with
/// `status` and `body` as `application/dns-message`.
pub async fn start_mock_upstream(status: StatusCode, body: &'static [u8]) -> (SocketAddr, Captures) {
    let captures: Captures = Arc::default();
    let recorded = captures.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let recorded = recorded.clone();
        async move {
            let (parts, inbound) = request.into_parts();
            let bytes = axum::body::to_bytes(inbound, usize::MAX).await.unwrap();
            recorded.lock().unwrap().push(Captured {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body: bytes,
            });
            (status, [(header::CONTENT_TYPE, "application/dns-message")], body)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, captures)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running gateway and the handle that stops it.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(mut config: GatewayConfig) -> Gateway {
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.timeout_secs = 5;

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    Gateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

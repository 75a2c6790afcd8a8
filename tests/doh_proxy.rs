//! End-to-end tests: client → gateway → mock upstream resolver.

use axum::http::StatusCode;
use doh_gateway::doh::base64url_decode;
use doh_gateway::GatewayConfig;

mod common;

const HSTS: &str = "max-age=31536000";
const ANSWER: &[u8] = b"\x00\x00\x81\x80\x00\x01\x00\x01";

fn config_for(upstream: std::net::SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.endpoint = format!("http://{upstream}/dns-query");
    config
}

#[tokio::test]
async fn get_query_is_forwarded_with_query_verbatim() {
    let (upstream, captures) = common::start_mock_upstream(StatusCode::OK, ANSWER).await;
    let gateway = common::start_gateway(config_for(upstream)).await;

    let res = common::client()
        .get(gateway.url("/dns-query?dns=AAABAAABAAAAAAAAA3d3dwdleGFtcGxlA2NvbQAAAQAB"))
        .header("accept", "application/dns-message")
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["strict-transport-security"], HSTS);
    assert_eq!(res.headers()["content-type"], "application/dns-message");
    assert_eq!(&res.bytes().await.unwrap()[..], ANSWER);

    let captured = captures.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let seen = &captured[0];
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.uri.path(), "/dns-query");
    assert_eq!(
        seen.uri.query(),
        Some("dns=AAABAAABAAAAAAAAA3d3dwdleGFtcGxlA2NvbQAAAQAB")
    );
    assert_eq!(seen.headers["host"], "127.0.0.1");
    assert_eq!(
        seen.headers["forwarded"],
        format!(
            "by={0}; for=; host={0}; proto=http",
            gateway.addr
        )
        .as_str()
    );
}

#[tokio::test]
async fn post_query_is_translated_to_get() {
    let (upstream, captures) = common::start_mock_upstream(StatusCode::OK, ANSWER).await;
    let gateway = common::start_gateway(config_for(upstream)).await;

    let message: Vec<u8> = (0u8..=255).rev().take(61).collect();
    let res = common::client()
        .post(gateway.url("/dns-query"))
        .header("content-type", "application/dns-message")
        .header("x-forwarded-for", "203.0.113.5")
        .body(message.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["strict-transport-security"], HSTS);

    let captured = captures.lock().unwrap();
    let seen = &captured[0];
    assert_eq!(seen.method, "GET");
    assert!(seen.body.is_empty());
    assert!(!seen.headers.contains_key("content-type"));

    let query = seen.uri.query().unwrap();
    let encoded = query.strip_prefix("dns=").expect("dns parameter");
    assert!(!encoded.contains(['+', '/', '=', '&']));
    assert_eq!(base64url_decode(encoded).unwrap(), message);
    assert!(seen.headers["forwarded"]
        .to_str()
        .unwrap()
        .contains("for=203.0.113.5;"));
}

#[tokio::test]
async fn upstream_status_is_relayed_with_hsts() {
    let (upstream, _) = common::start_mock_upstream(StatusCode::SERVICE_UNAVAILABLE, b"busy").await;
    let gateway = common::start_gateway(config_for(upstream)).await;

    let res = common::client()
        .get(gateway.url("/dns-query?dns=AAAB"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let hsts: Vec<_> = res.headers().get_all("strict-transport-security").iter().collect();
    assert_eq!(hsts, vec![HSTS]);
    assert_eq!(res.text().await.unwrap(), "busy");
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let dead = common::closed_addr().await;
    let gateway = common::start_gateway(config_for(dead)).await;

    let res = common::client()
        .get(gateway.url("/dns-query?dns=AAAB"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["strict-transport-security"], HSTS);
    assert!(res.text().await.unwrap().starts_with("bad gateway"));
}

#[tokio::test]
async fn other_paths_pass_through() {
    let (upstream, captures) = common::start_mock_upstream(StatusCode::OK, ANSWER).await;
    let gateway = common::start_gateway(config_for(upstream)).await;

    let res = common::client()
        .get(gateway.url("/index.html"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-middleware-next"], "1");
    assert_eq!(res.headers()["strict-transport-security"], HSTS);
    assert!(res.bytes().await.unwrap().is_empty());
    assert!(captures.lock().unwrap().is_empty());
}

#[tokio::test]
async fn configured_origin_receives_untouched_requests() {
    let (resolver, resolver_captures) = common::start_mock_upstream(StatusCode::OK, ANSWER).await;
    let (origin, origin_captures) = common::start_mock_upstream(StatusCode::OK, b"site").await;

    let mut config = config_for(resolver);
    config.passthrough.origin = Some(format!("http://{origin}"));
    let gateway = common::start_gateway(config).await;

    let res = common::client()
        .delete(gateway.url("/api/items?id=7"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["strict-transport-security"], HSTS);
    assert_eq!(res.text().await.unwrap(), "site");

    assert!(resolver_captures.lock().unwrap().is_empty());
    let captured = origin_captures.lock().unwrap();
    assert_eq!(captured[0].method, "DELETE");
    assert_eq!(captured[0].uri.path(), "/api/items");
    assert_eq!(captured[0].uri.query(), Some("id=7"));
    assert!(!captured[0].headers.contains_key("forwarded"));
}

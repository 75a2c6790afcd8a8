//! DoH reverse-proxy translator.
//!
//! # Data Flow
//! ```text
//! inbound /dns-query
//!     → upstream URL = configured endpoint + inbound query
//!     → headers = inbound + Forwarded, host = upstream hostname
//!     → POST with body? buffer → base64url → GET ?dns=…
//!     → otherwise forward method and body unchanged
//!     → relay upstream status/headers/body
//! ```
//!
//! Every failure becomes a 502; nothing propagates past `translate`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response};
use url::Url;

use super::codec::base64url_encode;
use super::upstream::{OutboundRequest, Upstream};
use crate::error::Result;
use crate::http::body::ProxyBody;
use crate::http::request::InboundUrl;
use crate::http::response::bad_gateway;
use crate::security::headers::{forwarded_value, strip_hop_by_hop};

/// Headers describing a body that the GET translation drops.
const BODY_HEADERS: [header::HeaderName; 4] = [
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::CONTENT_ENCODING,
    header::TRANSFER_ENCODING,
];

#[derive(Debug, Clone)]
pub struct DohTranslator {
    endpoint: Url,
    upstream: Arc<dyn Upstream>,
    max_body_bytes: usize,
}

impl DohTranslator {
    pub fn new(endpoint: Url, upstream: Arc<dyn Upstream>, max_body_bytes: usize) -> Self {
        Self {
            endpoint,
            upstream,
            max_body_bytes,
        }
    }

    /// Forward a DoH request, turning any failure into a 502.
    pub async fn translate(&self, request: Request<Body>) -> Response<Body> {
        match self.forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(upstream = %self.endpoint, error = %e, "DoH forward failed");
                bad_gateway(e)
            }
        }
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response<Body>> {
        let outbound = self.build_outbound(request).await?;
        tracing::debug!(
            method = %outbound.method,
            url = %outbound.url,
            headers = ?outbound.headers,
            body = ?outbound.body,
            "Forwarding DoH query"
        );
        self.upstream.send(outbound).await
    }

    /// Rewrite an inbound request into the request sent upstream.
    pub async fn build_outbound(&self, request: Request<Body>) -> Result<OutboundRequest> {
        let inbound = InboundUrl::of(&request);
        let (parts, body) = request.into_parts();

        let mut url = self.endpoint.clone();
        url.set_query(parts.uri.query());

        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);
        let forwarded = forwarded_value(&headers, &inbound.host, inbound.is_https());
        headers.append(header::FORWARDED, HeaderValue::try_from(forwarded)?);
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
        headers.insert(header::HOST, HeaderValue::from_str(host)?);

        let body = ProxyBody::from_inbound(body);
        if parts.method != Method::POST {
            return Ok(OutboundRequest {
                method: parts.method,
                url,
                headers,
                body,
            });
        }

        let message = body.buffer(self.max_body_bytes).await?;
        if message.is_empty() {
            return Ok(OutboundRequest {
                method: Method::POST,
                url,
                headers,
                body: ProxyBody::Buffered(message),
            });
        }

        url.set_query(Some(&format!("dns={}", base64url_encode(&message))));
        for name in &BODY_HEADERS {
            headers.remove(name);
        }
        Ok(OutboundRequest {
            method: Method::GET,
            url,
            headers,
            body: ProxyBody::Empty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doh::codec::base64url_decode;
    use crate::error::ProxyError;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    /// Records what would have been sent and answers with a canned response.
    #[derive(Debug, Default)]
    struct Recorder {
        sent: Mutex<Vec<(Method, Url, axum::http::HeaderMap, Vec<u8>)>>,
        fail: bool,
    }

    #[async_trait]
    impl Upstream for Recorder {
        async fn send(&self, request: OutboundRequest) -> Result<Response<Body>> {
            let body = request.body.buffer(usize::MAX).await?;
            self.sent
                .lock()
                .unwrap()
                .push((request.method, request.url, request.headers, body.to_vec()));
            if self.fail {
                return Err(ProxyError::Url(url::ParseError::EmptyHost));
            }
            let mut response = Response::new(Body::from("answer"));
            *response.status_mut() = StatusCode::IM_A_TEAPOT;
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/dns-message"));
            Ok(response)
        }
    }

    fn translator(recorder: Arc<Recorder>) -> DohTranslator {
        let endpoint = Url::parse("https://resolver.example/dns-query?ignored=1").unwrap();
        DohTranslator::new(endpoint, recorder, 65_535)
    }

    #[tokio::test]
    async fn get_replaces_query_and_relays_response() {
        let recorder = Arc::new(Recorder::default());
        let request = Request::builder()
            .uri("/dns-query?dns=AAABAAABAAAAAAAAA3d3dw")
            .header("host", "edge.example")
            .header("accept", "application/dns-message")
            .body(Body::empty())
            .unwrap();

        let response = translator(recorder.clone()).translate(request).await;
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/dns-message");
        let body = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
        assert_eq!(&body[..], b"answer");

        let sent = recorder.sent.lock().unwrap();
        let (method, url, headers, body) = &sent[0];
        assert_eq!(*method, Method::GET);
        assert_eq!(url.as_str(), "https://resolver.example/dns-query?dns=AAABAAABAAAAAAAAA3d3dw");
        assert_eq!(headers[header::HOST], "resolver.example");
        assert_eq!(headers[header::ACCEPT], "application/dns-message");
        assert_eq!(
            headers[header::FORWARDED],
            "by=edge.example; for=; host=edge.example; proto=http"
        );
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn missing_inbound_query_clears_endpoint_query() {
        let recorder = Arc::new(Recorder::default());
        let request = Request::builder().uri("/dns-query").body(Body::empty()).unwrap();
        let outbound = translator(recorder).build_outbound(request).await.unwrap();
        assert_eq!(outbound.url.as_str(), "https://resolver.example/dns-query");
    }

    #[tokio::test]
    async fn post_with_body_becomes_get() {
        let recorder = Arc::new(Recorder::default());
        let message: Vec<u8> = vec![0xab, 0xcd, 0x01, 0x00, 0xff, 0xfe, 0xfb];
        let request = Request::builder()
            .method("POST")
            .uri("/dns-query?ignored=yes")
            .header("host", "edge.example")
            .header("content-type", "application/dns-message")
            .header("content-length", message.len())
            .body(Body::from(message.clone()))
            .unwrap();

        let outbound = translator(recorder).build_outbound(request).await.unwrap();
        assert_eq!(outbound.method, Method::GET);
        assert!(outbound.body.is_empty());
        assert!(!outbound.headers.contains_key(header::CONTENT_TYPE));
        assert!(!outbound.headers.contains_key(header::CONTENT_LENGTH));

        let pairs: Vec<_> = outbound.url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "dns");
        assert!(!pairs[0].1.contains(['+', '/', '=']));
        assert_eq!(base64url_decode(&pairs[0].1).unwrap(), message);
    }

    #[tokio::test]
    async fn empty_post_is_forwarded_as_post() {
        let recorder = Arc::new(Recorder::default());
        let request = Request::builder()
            .method("POST")
            .uri("/dns-query")
            .body(Body::empty())
            .unwrap();

        translator(recorder.clone()).translate(request).await;
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent[0].0, Method::POST);
        assert_eq!(sent[0].1.as_str(), "https://resolver.example/dns-query");
    }

    #[tokio::test]
    async fn forwarded_is_appended_not_replaced() {
        let recorder = Arc::new(Recorder::default());
        let request = Request::builder()
            .uri("https://edge.example/dns-query")
            .header("forwarded", "for=198.51.100.1")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap();

        let outbound = translator(recorder).build_outbound(request).await.unwrap();
        let values: Vec<_> = outbound.headers.get_all(header::FORWARDED).iter().collect();
        assert_eq!(
            values,
            vec![
                "for=198.51.100.1",
                "by=edge.example; for=203.0.113.9; host=edge.example; proto=https"
            ]
        );
    }

    #[tokio::test]
    async fn oversized_post_is_bad_gateway() {
        let recorder = Arc::new(Recorder::default());
        let endpoint = Url::parse("https://resolver.example/dns-query").unwrap();
        let translator = DohTranslator::new(endpoint, recorder.clone(), 4);
        let request = Request::builder()
            .method("POST")
            .uri("/dns-query")
            .body(Body::from(vec![1u8; 16]))
            .unwrap();

        let response = translator.translate(request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let request = Request::builder().uri("/dns-query?dns=AA").body(Body::empty()).unwrap();

        let response = translator(recorder).translate(request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.starts_with(b"bad gateway\n"));
    }
}

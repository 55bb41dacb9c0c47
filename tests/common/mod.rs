//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use form_relay::{HttpServer, RelayConfig, Shutdown};

pub const BOUNDARY: &str = "----form-relay-test-7d1f";

/// What the mock downstream saw for one request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub body: Bytes,
}

/// Requests received by a mock downstream.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Captured>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<Captured> {
        self.0.lock().unwrap().clone()
    }
}

/// Canned reply of a mock downstream.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl MockReply {
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/html",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    recorder: Recorder,
}

async fn mock_process(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(String::from);
    state.recorder.0.lock().unwrap().push(Captured {
        content_type: header_str("content-type"),
        request_id: header_str("x-request-id"),
        body,
    });

    tokio::time::sleep(state.reply.delay).await;
    (
        state.reply.status,
        [(header::CONTENT_TYPE, state.reply.content_type)],
        state.reply.body.clone(),
    )
}

/// Start a mock downstream serving `POST /api/process` on an ephemeral port.
pub async fn start_upstream(reply: MockReply) -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/api/process", post(mock_process))
        .with_state(MockState {
            reply,
            recorder: recorder.clone(),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, recorder)
}

/// Start a downstream whose `/api/process` answers `307` to `/api/other`,
/// which itself answers JSON. Both routes record what they receive.
pub async fn start_redirecting_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let redirect = MockState {
        reply: MockReply {
            status: StatusCode::TEMPORARY_REDIRECT,
            content_type: "text/plain",
            body: String::new(),
            delay: Duration::ZERO,
        },
        recorder: recorder.clone(),
    };
    let target = MockState {
        reply: MockReply::json(StatusCode::OK, r#"{"second":true}"#),
        recorder: recorder.clone(),
    };

    let app = Router::new()
        .route(
            "/api/process",
            post(move |headers: HeaderMap, body: Bytes| {
                let state = redirect.clone();
                async move {
                    let mut response = mock_process(State(state), headers, body).await.into_response();
                    response
                        .headers_mut()
                        .insert(header::LOCATION, header::HeaderValue::from_static("/api/other"));
                    response
                }
            }),
        )
        .route("/api/other", post(mock_process).with_state(target));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, recorder)
}

/// Start a raw backend that reads the request head, writes `response`
/// verbatim and closes the socket.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut seen = Vec::new();
                let mut buf = [0u8; 4096];
                while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn upstream_url(addr: SocketAddr) -> String {
    format!("http://{}/api/process", addr)
}

/// Config pointing at `upstream`.
pub fn relay_config(upstream: SocketAddr) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.url = upstream_url(upstream);
    config
}

/// Start the relay on an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

pub fn relay_url(addr: SocketAddr) -> String {
    format!("http://{}/api/process", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// A form with a binary `file` field and a `mode=fast` text field.
pub fn sample_form() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"scan.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, 0x50, 0x4e, 0x47, 0x00, 0xff, 0x0d, 0x0a, 0x1a, 0x0a, 0x7f, 0x80]);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\nfast\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    body
}

//! HTTP client tests against an in-process fake backend.
//!
//! The fake answers every request with one canned status and body, which
//! tests can swap while a subscription is polling.

#![cfg(feature = "api-client")]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use depin_core::history::HistoryView;
use depin_core::{ApiClient, Error, PollOptions, Shared, subscribe};

const HISTORY_BODY: &str = r#"[
    {"id": 1, "device": "Sensor-01", "hash": "0xaa", "value": "23.5C",
     "timestamp": "2025-04-10 09:00:00", "status": "normal"},
    {"id": 2, "device": "Sensor-02", "hash": "0xbb", "value": "64.9%",
     "timestamp": "2025-04-10 09:01:00", "status": "pending"}
]"#;

#[derive(Clone)]
struct FakeBackend {
    addr: SocketAddr,
    reply: Arc<Mutex<(u16, String)>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let backend = FakeBackend {
            addr: listener.local_addr().unwrap(),
            reply: Arc::new(Mutex::new((status, body.to_string()))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let server = backend.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let server = server.clone();
                tokio::spawn(async move { server.serve(stream).await });
            }
        });
        backend
    }

    async fn serve(&self, mut stream: TcpStream) {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
        self.requests
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(&head).into_owned());

        let (status, body) = self.reply.lock().unwrap().clone();
        let response = format!(
            "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    fn set_reply(&self, status: u16, body: &str) {
        *self.reply.lock().unwrap() = (status, body.to_string());
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> String {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[tokio::test]
async fn test_requests_carry_api_key_and_content_type() {
    let backend = FakeBackend::start(200, HISTORY_BODY).await;
    let client = ApiClient::new(&backend.url(), Some("secret-key")).unwrap();

    let records = client.fetch_history().await.unwrap();
    assert_eq!(records.len(), 2);

    let request = backend.last_request().to_ascii_lowercase();
    assert!(request.starts_with("get /api/history "), "{request}");
    assert!(request.contains("x-api-key: secret-key"), "{request}");
    assert!(request.contains("content-type: application/json"), "{request}");
}

#[tokio::test]
async fn test_no_key_header_without_key() {
    let backend = FakeBackend::start(200, r#"{"status": "ok"}"#).await;
    let client = ApiClient::new(&backend.url(), None).unwrap();

    assert_eq!(client.health().await.unwrap().status, "ok");
    let request = backend.last_request().to_ascii_lowercase();
    assert!(request.starts_with("get /health "), "{request}");
    assert!(!request.contains("x-api-key"));
}

#[tokio::test]
async fn test_error_status_uses_detail_message() {
    let backend = FakeBackend::start(500, r#"{"detail": "database offline"}"#).await;
    let client = ApiClient::new(&backend.url(), Some("k")).unwrap();

    match client.fetch_blockchain().await {
        Err(Error::ApiStatus { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    backend.set_reply(401, r#"{"error": "invalid api key"}"#);
    match client.fetch_analysis().await {
        Err(Error::ApiStatus { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(client.health().await.is_err());
}

#[tokio::test]
async fn test_closed_port_is_not_reachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}"), None).unwrap();
    let result = client.fetch_dashboard().await;
    assert!(matches!(result, Err(Error::NotReachable { .. })), "{result:?}");
}

#[tokio::test]
async fn test_failed_polls_leave_view_untouched_until_recovery() {
    let backend = FakeBackend::start(500, r#"{"detail": "boom"}"#).await;
    let client = Arc::new(ApiClient::new(&backend.url(), Some("k")).unwrap());
    let view: Shared<HistoryView> = Shared::default();

    let sub = subscribe(
        view.clone(),
        client,
        PollOptions::with_interval(Duration::from_millis(50)),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(view.revision(), 0);
    assert!(backend.request_count() >= 3);
    let stats = sub.stats();
    assert_eq!(stats.successes, 0);
    assert!(stats.consecutive_failures >= 3);
    assert!(stats.last_error.unwrap().contains("boom"));

    backend.set_reply(200, HISTORY_BODY);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(view.revision() > 0);
    assert!(!sub.stats().is_failing());
    view.read(|v| {
        assert_eq!(v.entries().len(), 2);
        assert_eq!(v.entries().head().unwrap().id, 2);
    });
    sub.stop();
}

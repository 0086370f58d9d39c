//! Minimal canned-response HTTP gateway for integration tests.
//!
//! Accepts any number of connections, answers each with the same response,
//! and records the raw requests (lowercased) for header assertions.

#![allow(dead_code)]

use fleetcam::config::GatewayConfig;
use fleetcam::SignalingClient;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct MockGateway {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockGateway {
    /// Spawn a gateway answering every request with `status_line` (e.g.
    /// "200 OK") and `body`.
    pub async fn spawn(status_line: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock gateway");
        let addr = listener.local_addr().expect("mock gateway addr");
        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        );

        let accept_requests = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let response = response.clone();
                let requests = Arc::clone(&accept_requests);
                tokio::spawn(async move {
                    serve_one(socket, response, requests).await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Gateway config pointing at this mock, with a short timeout.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url(),
            api_key: "test-key".to_string(),
            bearer_token: Some("test-token".to_string()),
            request_timeout_ms: 2_000,
        }
    }

    pub fn client(&self) -> SignalingClient {
        SignalingClient::new(&self.gateway_config()).expect("build signaling client")
    }

    /// Raw requests seen so far, lowercased for easy header matching.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

impl Drop for MockGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(mut socket: TcpStream, response: String, requests: Arc<Mutex<Vec<String>>>) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    // Read through the header terminator.
    let header_end = loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if let Some(pos) = find(&data, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    // Drain the body per Content-Length so the client sees a clean exchange.
    let head = String::from_utf8_lossy(&data[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }

    requests
        .lock()
        .expect("lock poisoned")
        .push(String::from_utf8_lossy(&data).to_ascii_lowercase());

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

//! Common test utilities: a minimal HTTP/1.1 mock backend for provider tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

/// What the mock backend does with each request
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with this status and body
    Respond { status: u16, body: Vec<u8> },
    /// Read the request, then never answer
    Hang,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Reply::Respond {
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            body: body.as_bytes().to_vec(),
        }
    }
}

/// A request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus raw query string
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    disconnected: Arc<Notify>,
}

impl MockServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let disconnected = Arc::new(Notify::new());

        let recorded = requests.clone();
        let closed = disconnected.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let reply = reply.clone();
                let recorded = recorded.clone();
                let closed = closed.clone();
                tokio::spawn(async move {
                    handle(stream, reply, recorded, closed).await;
                });
            }
        });

        Self {
            addr,
            requests,
            disconnected,
        }
    }

    /// Base URL, without a trailing slash
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until a hung connection is closed by the client
    pub async fn wait_for_disconnect(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.disconnected.notified())
            .await
            .is_ok()
    }
}

async fn handle(
    mut stream: TcpStream,
    reply: Reply,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    closed: Arc<Notify>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    recorded.lock().unwrap().push(RecordedRequest {
        method,
        target,
        headers,
    });

    match reply {
        Reply::Respond { status, body } => {
            let reason = if (200..300).contains(&status) { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        }
        Reply::Hang => loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => {
                    closed.notify_one();
                    return;
                }
                Ok(_) => continue,
            }
        },
    }
}

/// HTTP client that ignores proxy environment variables
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build test client")
}

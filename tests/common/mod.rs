//! Shared utilities for integration testing.
//!
//! `MockNode` listens on a local port and is handed to the client as its
//! forward proxy. Plain-HTTP requests reach it in absolute form, so it can
//! answer for any node URL while recording what it was asked.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ledger_batch::config::BatchConfig;

/// Node URL used by integration tests. Never resolved; the mock proxy answers.
pub const NODE_URL: &str = "http://node.test/v1";

pub const TEST_PRIVATE_KEY: &str =
    "9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Origin-form path, e.g. `/v1/transactions`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct MockNode {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockNode {
    /// Start a programmable node. `handler` picks the status and body.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        let handler = handler.clone();
                        let recorded = recorded.clone();
                        tokio::spawn(async move {
                            let Some(request) = read_request(&mut socket).await else {
                                return;
                            };
                            let (status, body) = handler(&request);
                            recorded.lock().unwrap().push(request);

                            let response = format!(
                                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status,
                                reason(status),
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, requests }
    }

    /// Proxy line pointing at this node, in the wallets-file format.
    pub fn proxy_line(&self) -> String {
        format!("127.0.0.1:{}", self.addr.port())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests with this method whose path starts with `prefix`.
    pub fn count(&self, method: &str, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }
}

/// Defaults with fast polling and no pauses.
pub fn fast_config() -> BatchConfig {
    let mut config = BatchConfig::default();
    config.node.rpc_url = NODE_URL.to_string();
    config.node.request_timeout_secs = 5;
    config.node.connect_timeout_secs = 2;
    config.retries.max_attempts = 3;
    config.retries.cooldown_secs = 0;
    config.retries.balance_cooldown_secs = 0;
    config.polling.interval_ms = 10;
    config.polling.max_attempts = 5;
    config.batch.sleep_ms = 0;
    config
}

pub fn coin_store(octas: u64) -> String {
    format!(
        r#"{{"type":"0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>","data":{{"coin":{{"value":"{}"}},"frozen":false}}}}"#,
        octas
    )
}

pub fn ledger_info() -> String {
    r#"{"chain_id":4,"epoch":"1","ledger_version":"100","ledger_timestamp":"1700000000000000"}"#
        .to_string()
}

pub fn account_info(sequence_number: u64) -> String {
    format!(
        r#"{{"sequence_number":"{}","authentication_key":"0x00"}}"#,
        sequence_number
    )
}

pub fn committed(hash: &str, success: bool, vm_status: &str) -> String {
    format!(
        r#"{{"type":"user_transaction","hash":"{}","success":{},"vm_status":"{}","version":"101"}}"#,
        hash, success, vm_status
    )
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Some(RecordedRequest {
        method,
        path: origin_path(target),
        headers,
        body,
    })
}

fn origin_path(target: &str) -> String {
    match target.split_once("://") {
        Some((_, rest)) => rest
            .find('/')
            .map(|i| rest[i..].to_string())
            .unwrap_or_else(|| "/".to_string()),
        None => target.to_string(),
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 | 202 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

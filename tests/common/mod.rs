//! Shared utilities for integration testing.
//!
//! A minimal JSON-RPC backend on a raw `TcpListener`. Each backend binds an
//! ephemeral port and answers every request with a programmable delay and
//! reply, which tests can change while the backend is running.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

/// How a mock backend answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{"result": value}` for every method.
    Result(Value),
    /// Per-method results; unknown methods get a JSON-RPC error.
    Methods(HashMap<String, Value>),
    /// `{"error": {...}}` for every method.
    RpcError,
    /// Bare HTTP status with an empty body.
    Status(u16),
    /// 200 OK with a body that is not JSON.
    Garbage,
}

struct State {
    delay_ms: AtomicU64,
    reply: Mutex<Reply>,
    requests: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockRpc {
    url: Url,
    state: Arc<State>,
}

impl MockRpc {
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.state.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// `params` of every received request for `method`, oldest first.
    pub fn params_for(&self, method: &str) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|body| body.get("method").and_then(Value::as_str) == Some(method))
            .map(|body| body.get("params").cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Start a backend answering `eth_chainId` with `chain_id` after `delay_ms`.
pub async fn start_chain(chain_id: Value, delay_ms: u64) -> MockRpc {
    start_mock_rpc(Reply::Result(chain_id), delay_ms).await
}

/// Start a programmable JSON-RPC backend on an ephemeral port.
pub async fn start_mock_rpc(reply: Reply, delay_ms: u64) -> MockRpc {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(State {
        delay_ms: AtomicU64::new(delay_ms),
        reply: Mutex::new(reply),
        requests: AtomicUsize::new(0),
        bodies: Mutex::new(Vec::new()),
    });

    let shared = state.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let state = shared.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, state).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockRpc {
        url: Url::parse(&format!("http://{}/", addr)).unwrap(),
        state,
    }
}

/// A URL nothing listens on.
pub async fn closed_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

async fn serve(mut socket: TcpStream, state: Arc<State>) -> std::io::Result<()> {
    let body = read_request(&mut socket).await?;
    state.requests.fetch_add(1, Ordering::SeqCst);

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.bodies.lock().unwrap().push(request.clone());
    let id = request.get("id").cloned().unwrap_or(json!(1));
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let reply = state.reply.lock().unwrap().clone();
    let (status, payload) = match reply {
        Reply::Result(value) => (200, json!({"jsonrpc": "2.0", "id": id, "result": value}).to_string()),
        Reply::Methods(methods) => match methods.get(&method) {
            Some(value) => (200, json!({"jsonrpc": "2.0", "id": id, "result": value}).to_string()),
            None => (200, rpc_error(id, &format!("method {} not found", method))),
        },
        Reply::RpcError => (200, rpc_error(id, "internal error")),
        Reply::Status(code) => (code, String::new()),
        Reply::Garbage => (200, "<html>not json</html>".to_string()),
    };

    let status_text = match status {
        200 => "200 OK",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "500 Internal Server Error",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        payload.len(),
        payload
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn rpc_error(id: Value, message: &str) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": -32601, "message": message},
    })
    .to_string()
}

/// Read headers and a `Content-Length` body.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf[header_end..].to_vec())
}

//! HTTP-level tests: a real server on an ephemeral port, raw http1 requests.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tally_core::auth;
use tally_server::{Server, ServerConfig};
use tally_store::{MemoryStore, RetryingStore};

async fn spawn_server(store: Arc<MemoryStore>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(ServerConfig::default(), store);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    addr
}

/// Sends one raw http1 POST and returns `(status, decoded frame)`.
async fn post(addr: SocketAddr, path: &str, body: &Value) -> (u16, Value) {
    let payload = body.to_string();
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    let status: u16 = text
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let frame = text
        .split_once("\r\n\r\n")
        .map(|(_, body)| serde_json::from_str(body).unwrap())
        .unwrap();
    (status, frame)
}

fn user_request(method: &str, arguments: Value) -> Value {
    json!({
        "account": "horns&hoofs",
        "login": "h&f",
        "token": auth::user_token("horns&hoofs", "h&f"),
        "method": method,
        "arguments": arguments,
    })
}

#[tokio::test]
async fn score_request_succeeds() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;
    let body = user_request("online_score", json!({"phone": "79175002040", "email": "a@b.com"}));
    let (status, frame) = post(addr, "/method", &body).await;
    assert_eq!(status, 200);
    assert_eq!(frame, json!({"response": {"score": 3.0}, "code": 200}));
}

#[tokio::test]
async fn interests_request_succeeds() {
    let store = Arc::new(MemoryStore::new());
    store.insert("i:1", r#"["books"]"#);
    let addr = spawn_server(store).await;

    let body = user_request("clients_interests", json!({"client_ids": [1, 2]}));
    let (status, frame) = post(addr, "/method", &body).await;
    assert_eq!(status, 200);
    assert_eq!(
        frame,
        json!({"response": {"1": ["books"], "2": []}, "code": 200})
    );
}

#[tokio::test]
async fn bad_token_is_forbidden() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;
    let mut body = user_request("online_score", json!({"phone": "79175002040", "email": "a@b.com"}));
    body["token"] = json!("wrong");
    let (status, frame) = post(addr, "/method", &body).await;
    assert_eq!(status, 403);
    assert_eq!(frame["code"], json!(403));
}

#[tokio::test]
async fn empty_envelope_is_invalid_request() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;
    let (status, frame) = post(addr, "/method", &json!({})).await;
    assert_eq!(status, 422);
    assert_eq!(frame["code"], json!(422));
    assert!(frame["error"].as_str().unwrap().contains("login"));
}

#[tokio::test]
async fn retry_wrapped_store_serves_requests() {
    // Same wiring as the binary: the store sits behind the retry decorator.
    let store = MemoryStore::new();
    store.insert("i:7", r#"["music"]"#);
    let store = Arc::new(RetryingStore::new(store));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Server::new(ServerConfig::default(), store);
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    let body = user_request("clients_interests", json!({"client_ids": [7]}));
    let (status, frame) = post(addr, "/method", &body).await;
    assert_eq!(status, 200);
    assert_eq!(frame, json!({"response": {"7": ["music"]}, "code": 200}));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;
    let (status, _) = post(addr, "/other", &json!({})).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn undecodable_body_is_bad_request() {
    let addr = spawn_server(Arc::new(MemoryStore::new())).await;
    // A JSON array is decodable but not a request object.
    let (status, frame) = post(addr, "/method", &json!(["x"])).await;
    assert_eq!(status, 400);
    assert_eq!(frame, json!({"error": "Bad Request", "code": 400}));
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Driver tests against a minimal in-process HTTP stub.

use std::net::SocketAddr;
use std::time::Duration;

use hopbench_driver::{BenchConfig, poll_http_ready, run_benchmark};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Stub server: /hello as text, /relay as JSON, anything else 404
// ---------------------------------------------------------------------------

async fn spawn_stub() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 2048];
                let n = sock.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let (status, content_type, body) = if request.starts_with("GET /hello") {
                    ("200 OK", "text/plain", "Hello, world!".to_string())
                } else if request.starts_with("GET /relay") {
                    (
                        "200 OK",
                        "application/json",
                        r#"{"status":"ok","nested_ms":0.42}"#.to_string(),
                    )
                } else {
                    ("404 Not Found", "text/plain", "not found".to_string())
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    (addr, handle)
}

// ---------------------------------------------------------------------------
// Readiness polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_succeeds_against_live_endpoint() {
    let (addr, server) = spawn_stub().await;
    let client = reqwest::Client::new();
    poll_http_ready(
        &client,
        &format!("http://{addr}/hello"),
        Duration::from_millis(20),
        Duration::from_secs(5),
    )
    .await
    .expect("stub is live");
    server.abort();
}

#[tokio::test]
async fn poll_times_out_when_nothing_listens() {
    let client = reqwest::Client::new();
    // Port 1 is essentially never listening on a test host.
    let err = poll_http_ready(
        &client,
        "http://127.0.0.1:1/hello",
        Duration::from_millis(20),
        Duration::from_millis(150),
    )
    .await
    .expect_err("nothing is listening");
    assert!(err.to_string().contains("not ready"));
}

// ---------------------------------------------------------------------------
// Full benchmark loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn benchmark_batches_and_reduces() {
    let (addr, server) = spawn_stub().await;
    let client = reqwest::Client::new();
    let config = BenchConfig {
        base_url: format!("http://{addr}"),
        warmup: 2,
        requests: 5,
    };

    let report = run_benchmark(&client, &config).await.expect("stub answers");

    assert_eq!(report.direct.count, 5);
    assert_eq!(report.relay.count, 5);
    assert_eq!(report.nested.count, 5);
    assert!(report.direct.mean_ms > 0.0);
    assert!(report.direct.min_ms <= report.direct.mean_ms);
    assert!(report.direct.mean_ms <= report.direct.max_ms);
    // The stub reports a constant 0.42ms nested latency.
    assert!((report.nested.mean_ms - 0.42).abs() < 1e-6);
    assert!(report.nested_share_pct > 0.0);
    server.abort();
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start a mock endpoint on an ephemeral port that always answers `status`.
pub async fn start_mock_backend(status: u16) -> SocketAddr {
    start_programmable_backend(move || async move { (status, String::from("ok")) }).await
}

/// Start a mock endpoint whose response is computed per request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let (status, body) = f().await;
                respond(socket, status, &body).await;
            });
        }
    });

    addr
}

/// Start a mock endpoint that accepts connections and never answers.
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address with nothing listening on it.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn respond(mut socket: TcpStream, status: u16, body: &str) {
    // Drain the request head before answering.
    let mut buf = [0u8; 4096];
    let mut head = Vec::new();
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let status_text = match status {
        200 => "200 OK",
        204 => "204 No Content",
        301 => "301 Moved Permanently",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "418 I'm a teapot",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Client that never reuses connections and ignores proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn eventually<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

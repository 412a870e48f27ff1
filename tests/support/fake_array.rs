// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A minimal scripted HTTP/1.1 stand-in for a storage array's REST
//! management API, used where a real array is unreachable from CI. Not a
//! general-purpose HTTP server: it understands just enough of the protocol
//! (request line, `Content-Length`, a JSON body) to answer one scripted
//! response per incoming connection.

use std::sync::Arc;

use serde_json::Value;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::Mutex,
    task::JoinHandle,
};

/// One canned `(status, body)` pair, consumed in order as requests arrive.
pub struct ScriptedResponse {
    pub status: u16,
    pub body: Value,
}

impl ScriptedResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// A running fake array. Dropping this does not stop the listener task;
/// call [`FakeArray::stop`] explicitly when the test is done with it.
pub struct FakeArray {
    base_url: String,
    handle: JoinHandle<()>,
}

impl FakeArray {
    /// Binds an ephemeral local port and starts answering connections with
    /// `script`, one entry per accepted connection, in order. Once the
    /// script is exhausted, further connections are accepted and then
    /// dropped without a response (simulating a hung/unreachable array).
    pub async fn start(script: Vec<ScriptedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("binding fake array listener");
        let addr = listener.local_addr().expect("reading bound local addr");
        let script = Arc::new(Mutex::new(script.into_iter()));

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let next = script.lock().await.next();
                let Some(resp) = next else { continue };
                tokio::spawn(async move {
                    let _ = read_request(&mut stream).await;
                    let body = resp.body.to_string();
                    let status_line = status_line(resp.status);
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        _ => "500 Internal Server Error",
    }
}

/// Reads and discards one HTTP request: headers up to the blank line, then
/// exactly `Content-Length` bytes of body, if present.
async fn read_request(stream: &mut tokio::net::TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];
    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
    };

    let header_text = String::from_utf8_lossy(&buf[..header_end]);
    let content_length: usize = header_text
        .lines()
        .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let body_so_far = buf.len() - (header_end + 4);
    let mut remaining = content_length.saturating_sub(body_so_far);
    while remaining > 0 {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        remaining = remaining.saturating_sub(n);
    }
    Ok(())
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

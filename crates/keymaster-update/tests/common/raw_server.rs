//! Hand-written HTTP responses that wiremock cannot produce
//!
//! Serves a single connection: the body is written in the given chunks with
//! a pause before each one, and the connection is closed afterwards.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::constants::BINARY_PATH;

/// Serve one response; returns the URL to request.
///
/// Without `advertise_length` the body is delimited by closing the
/// connection, so the client never learns the total size.
pub async fn serve_chunked_body(
    chunks: Vec<Vec<u8>>,
    gap: Duration,
    advertise_length: bool,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let total: usize = chunks.iter().map(Vec::len).sum();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let mut head = String::from(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n",
        );
        if advertise_length {
            head.push_str(&format!("Content-Length: {}\r\n", total));
        }
        head.push_str("\r\n");
        socket.write_all(head.as_bytes()).await.unwrap();

        for chunk in chunks {
            tokio::time::sleep(gap).await;
            socket.write_all(&chunk).await.unwrap();
            socket.flush().await.unwrap();
        }
        let _ = socket.shutdown().await;
    });

    format!("http://{}{}", addr, BINARY_PATH)
}

//! In-process mock collector for tests.
//!
//! Each connection gets one scripted raw HTTP response. An empty response
//! closes the connection without answering.

use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request as the mock server received it.
#[derive(Debug)]
pub struct Captured {
    pub head: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }
}

async fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before request head");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let mut captured = Captured {
        head: String::from_utf8_lossy(&buf[..head_end]).to_string(),
        body: buf[head_end..].to_vec(),
    };
    let len: usize = captured
        .header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while captured.body.len() < len {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        captured.body.extend_from_slice(&chunk[..n]);
    }
    captured
}

/// Serves one scripted response per connection, in order, and returns
/// the captured requests once all responses were sent.
pub async fn mock_server(responses: Vec<String>) -> (Url, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let base = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for resp in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            captured.push(read_request(&mut stream).await);
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        captured
    });

    (base, handle)
}

/// `extra_headers` must be empty or end with `\r\n`.
pub fn raw_response(status: &str, extra_headers: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

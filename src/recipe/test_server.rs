//! Local HTTP server answering with canned JSON, for client tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Request {
  pub method: String,
  /// Path including the query string
  pub path: String,
  pub authorization: Option<String>,
  pub body: String,
}

#[derive(Debug, Clone)]
pub struct Reply {
  pub status: u16,
  pub body: String,
}

impl Reply {
  pub fn json(status: u16, body: impl Into<String>) -> Self {
    Self {
      status,
      body: body.into(),
    }
  }
}

pub struct TestServer {
  addr: SocketAddr,
  requests: Arc<Mutex<Vec<Request>>>,
}

impl TestServer {
  /// Serve every request with `handler` until the test runtime shuts down.
  pub async fn start<F>(handler: F) -> Self
  where
    F: Fn(&Request) -> Reply + Send + Sync + 'static,
  {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("test server address");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    let handler = Arc::new(handler);

    tokio::spawn(async move {
      while let Ok((mut stream, _)) = listener.accept().await {
        let handler = Arc::clone(&handler);
        let log = Arc::clone(&log);
        tokio::spawn(async move {
          let Some(request) = read_request(&mut stream).await else {
            return;
          };
          let reply = handler(&request);
          log.lock().expect("request log").push(request);

          let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            reply.status,
            reason(reply.status),
            reply.body.len(),
            reply.body
          );
          let _ = stream.write_all(response.as_bytes()).await;
          let _ = stream.shutdown().await;
        });
      }
    });

    Self { addr, requests }
  }

  pub fn base_url(&self) -> String {
    format!("http://{}/api", self.addr)
  }

  /// Requests served so far, in arrival order
  pub fn requests(&self) -> Vec<Request> {
    self.requests.lock().expect("request log").clone()
  }
}

fn reason(status: u16) -> &'static str {
  match status {
    200 => "OK",
    201 => "Created",
    204 => "No Content",
    401 => "Unauthorized",
    404 => "Not Found",
    500 => "Internal Server Error",
    _ => "Unknown",
  }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 4096];

  let head_end = loop {
    if let Some(pos) = find(&buf, b"\r\n\r\n") {
      break pos;
    }
    let n = stream.read(&mut chunk).await.ok()?;
    if n == 0 {
      return None;
    }
    buf.extend_from_slice(&chunk[..n]);
  };

  let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
  let mut lines = head.lines();
  let mut start = lines.next()?.split_whitespace();
  let method = start.next()?.to_string();
  let path = start.next()?.to_string();

  let mut authorization = None;
  let mut length = 0usize;
  for line in lines {
    if let Some((name, value)) = line.split_once(':') {
      let value = value.trim();
      if name.eq_ignore_ascii_case("authorization") {
        authorization = Some(value.to_string());
      } else if name.eq_ignore_ascii_case("content-length") {
        length = value.parse().unwrap_or(0);
      }
    }
  }

  let body_start = head_end + 4;
  while buf.len() < body_start + length {
    let n = stream.read(&mut chunk).await.ok()?;
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);
  }
  let body_end = (body_start + length).min(buf.len());
  let body = String::from_utf8_lossy(&buf[body_start..body_end]).to_string();

  Some(Request {
    method,
    path,
    authorization,
    body,
  })
}

//! A minimal HTTP server standing in for OSRM in integration tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Canned HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    /// A successful OSRM route response of `metres`.
    pub fn distance(metres: f64) -> Self {
        Self::json(
            200,
            format!(r#"{{"code":"Ok","routes":[{{"distance":{metres},"duration":1.0}}]}}"#),
        )
    }

    /// An arbitrary JSON body.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Hold the reply back for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Background server answering every request through a handler.
pub struct StubOsrmServer {
    base_url: String,
    requests: Arc<AtomicUsize>,
}

impl StubOsrmServer {
    /// Bind to an ephemeral local port and serve `handler` until the test
    /// process exits. The handler receives the request path and query.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let handler = Arc::new(handler);
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let handler = Arc::clone(&handler);
                counter.fetch_add(1, Ordering::SeqCst);
                thread::spawn(move || serve(stream, handler.as_ref()));
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// URL to configure the source with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Connections accepted so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn serve(stream: TcpStream, handler: &(dyn Fn(&str) -> Reply + Send + Sync)) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" => break,
            Ok(_) => {}
        }
    }
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let reply = handler(target);
    thread::sleep(reply.delay);
    let reason = if reply.status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Destination longitude encoded in an OSRM route path, e.g. `3` in
/// `/route/v1/driving/0,0;3,0?overview=false`.
pub fn destination_longitude(target: &str) -> f64 {
    target
        .split(';')
        .nth(1)
        .and_then(|tail| tail.split(',').next())
        .and_then(|lon| lon.parse().ok())
        .unwrap_or(f64::NAN)
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

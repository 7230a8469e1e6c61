//! Minimal HTTP/1.1 server that serves fixed image bodies for integration tests.
//!
//! Each path can be told to misbehave (fail the first N requests, always fail,
//! or announce more bytes than it sends) and every request is counted per path.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// 200 with the full body.
    Ok,
    /// 500 for the first `n` requests, then 200.
    FailFirst(usize),
    /// Always respond with this status and an empty body.
    AlwaysStatus(u16),
    /// Content-Length says `body.len() + 100`; the connection closes after `body`.
    Truncated,
}

#[derive(Debug, Clone)]
struct Route {
    body: Vec<u8>,
    behavior: Behavior,
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct ImageServer {
    base: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl ImageServer {
    /// Full URL for `path` (e.g. `"/1/001.jpg"`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Requests seen for `path` so far.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

/// Body used for path `path` in tests: short, distinct per path.
pub fn body_for(path: &str) -> Vec<u8> {
    let mut body = format!("IMG:{}:", path).into_bytes();
    body.extend((0u8..64).cycle().take(2048));
    body
}

/// Starts a server for `routes` (path, behavior). Bodies come from `body_for`.
pub fn start(routes: &[(&str, Behavior)]) -> ImageServer {
    let routes: HashMap<String, Route> = routes
        .iter()
        .map(|(path, behavior)| {
            (
                path.to_string(),
                Route {
                    body: body_for(path),
                    behavior: *behavior,
                },
            )
        })
        .collect();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    ImageServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>, hits: &Mutex<HashMap<String, usize>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/").to_string();
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let seen = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(path.clone()).or_insert(0);
        *count += 1;
        *count
    };

    let Some(route) = routes.get(&path) else {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    };

    match route.behavior {
        Behavior::FailFirst(n) if seen <= n => write_status(&mut stream, 500),
        Behavior::AlwaysStatus(code) => write_status(&mut stream, code),
        Behavior::Truncated => {
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                route.body.len() + 100
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&route.body);
        }
        _ => {
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                route.body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&route.body);
        }
    }
}

fn write_status(stream: &mut TcpStream, code: u16) {
    let response = format!(
        "HTTP/1.1 {} Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        code
    );
    let _ = stream.write_all(response.as_bytes());
}

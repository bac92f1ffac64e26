//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of pages by path. Unknown paths get 404. Each page can
//! delay its response to exercise the fetch timeout. The User-Agent of every
//! request is recorded so tests can check what was sent.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Page {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: None,
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub struct PageServer {
    /// Base URL without a trailing slash, e.g. "http://127.0.0.1:12345".
    pub base: String,
    user_agents: Arc<Mutex<Vec<String>>>,
}

impl PageServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(pages: Vec<(&str, Page)>) -> PageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let pages: Arc<HashMap<String, Page>> = Arc::new(
        pages
            .into_iter()
            .map(|(path, page)| (path.to_string(), page))
            .collect(),
    );
    let user_agents = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&user_agents);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let pages = Arc::clone(&pages);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &pages, &seen));
        }
    });
    PageServer {
        base: format!("http://127.0.0.1:{}", port),
        user_agents,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    pages: &HashMap<String, Page>,
    seen: &Mutex<Vec<String>>,
) {
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
    let (path, user_agent) = parse_request(request);
    if let Some(ua) = user_agent {
        seen.lock().unwrap().push(ua.to_string());
    }

    let page = pages
        .get(path)
        .cloned()
        .unwrap_or_else(|| Page::status(404, "<html><body><h1>Not Found</h1></body></html>"));

    if let Some(delay) = page.delay {
        thread::sleep(delay);
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        page.status,
        reason(page.status),
        page.body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(page.body.as_bytes());
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Returns (path, optional User-Agent header value).
fn parse_request(request: &str) -> (&str, Option<&str>) {
    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/");
    let mut user_agent = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.trim());
            }
        }
    }
    (path, user_agent)
}

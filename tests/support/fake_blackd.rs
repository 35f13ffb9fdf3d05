//! Minimal stand-in for a `blackd` daemon.
//!
//! Speaks just enough HTTP/1.1 for the client: one request per connection,
//! `Content-Length` bodies, `Connection: close` answers. Every request is
//! recorded so tests can assert on headers and bodies.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// One request as the daemon saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

type Responder = dyn Fn(&Recorded) -> (u16, Vec<u8>) + Send + Sync;

/// A daemon listening on an ephemeral loopback port.
pub struct FakeBlackd {
    pub port: u16,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBlackd {
    /// Starts a daemon answering with `respond`.
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, Vec<u8>) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake blackd");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let seen = Arc::clone(&seen);
                let respond = Arc::clone(&respond);
                thread::spawn(move || handle(stream, &seen, respond.as_ref()));
            }
        });

        Self { port, requests }
    }

    /// Starts a daemon that behaves like `black`: sources equal to
    /// [`FORMATTED`] are unchanged, sources containing `syntax error` fail
    /// to parse, sources containing `teapot` get an off-contract status and
    /// everything else is reformatted to [`FORMATTED`].
    pub fn black() -> Self {
        Self::start(|request| {
            let body = String::from_utf8_lossy(&request.body);
            if body.contains("teapot") {
                (418, b"I'm a teapot".to_vec())
            } else if body.contains("syntax error") {
                (400, b"Cannot parse: 1:4: syntax error\n".to_vec())
            } else if request.body == FORMATTED.as_bytes() {
                (204, Vec::new())
            } else if request.headers.contains_key("x-diff") {
                (200, DIFF.as_bytes().to_vec())
            } else {
                (200, FORMATTED.as_bytes().to_vec())
            }
        })
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// What [`FakeBlackd::black`] formats every file to.
pub const FORMATTED: &str = "x = 1\n";

/// Diff answered by [`FakeBlackd::black`] when one is requested.
pub const DIFF: &str = "--- STDIN\t2024-01-01 00:00:00.000000+00:00\n\
                        +++ STDOUT\t2024-01-01 00:00:01.000000+00:00\n\
                        @@ -1 +1 @@\n\
                        -x=1\n\
                        +x = 1\n";

fn handle(stream: TcpStream, seen: &Mutex<Vec<Recorded>>, respond: &Responder) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    if reader.read_line(&mut line).unwrap_or(0) == 0 {
        return;
    }

    let mut headers = HashMap::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let request = Recorded { headers, body };
    let (status, payload) = respond(&request);
    seen.lock().expect("requests lock").push(request);

    let mut stream = reader.into_inner();
    let head = if status == 204 {
        format!("HTTP/1.1 {status} {}\r\nConnection: close\r\n\r\n", reason(status))
    } else {
        format!(
            "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            reason(status),
            payload.len()
        )
    };
    let _ = stream.write_all(head.as_bytes());
    if status != 204 {
        let _ = stream.write_all(&payload);
    }
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        418 => "I'm a teapot",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Accepts connections and never answers, for timeout tests.
pub struct SilentDaemon {
    pub port: u16,
}

impl SilentDaemon {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent daemon");
        let port = listener.local_addr().expect("local addr").port();
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });
        Self { port }
    }
}

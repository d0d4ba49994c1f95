//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every GET with a single static body. Can be told to advertise a
//! longer Content-Length than it sends and then hang up, to simulate a
//! stream that breaks off mid-body.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyServerOptions {
    /// If set, only this many body bytes are written before the connection closes.
    pub truncate_at: Option<usize>,
}

pub struct BodyServer {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl BodyServer {
    /// Number of requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> BodyServer {
    start_with_options(body, BodyServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: BodyServerOptions) -> BodyServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                handle(stream, &body, opts)
            });
        }
    });
    BodyServer {
        url: format!("http://127.0.0.1:{}/payload.bin", port),
        requests,
    }
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: BodyServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        body.len()
    );
    if stream.write_all(header.as_bytes()).is_err() {
        return;
    }
    let sent = opts.truncate_at.unwrap_or(body.len()).min(body.len());
    // Written in small pieces so a throttled client can apply backpressure.
    for piece in body[..sent].chunks(4096) {
        if stream.write_all(piece).is_err() {
            return;
        }
    }
    let _ = stream.flush();
}

/// A URL on localhost where nothing is listening.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

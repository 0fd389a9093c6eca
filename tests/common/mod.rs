//! Shared helpers for integration tests: a loopback HTTP stub and canned replies.

#![allow(dead_code)]

use resume_matcher::llm::CompletionClient;
use resume_matcher::Result;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub const ANALYSIS_JSON: &str = r#"{
  "match_score": 58,
  "score_explanation": "Strong SQL background but no Go, Rust or Kubernetes experience.",
  "missing_keywords": ["Kubernetes", "Terraform", "Kafka", "gRPC", "Prometheus"],
  "improvements": [
    "Describe the scale of the Node.js APIs",
    "Add any infrastructure-as-code work",
    "Mention on-call or incident response",
    "Quantify PostgreSQL performance work",
    "Lead the summary with backend experience"
  ],
  "rewritten_bullets": [
    {"original": "Maintained Node.js REST APIs backed by PostgreSQL", "improved": "Owned Node.js REST APIs on PostgreSQL serving 5M requests/day", "keywords_added": ["PostgreSQL"]},
    {"original": "Worked on deployments and monitoring", "improved": "Automated deployments and built Prometheus dashboards", "keywords_added": ["Prometheus"]},
    {"original": "Wrote unit tests", "improved": "Raised backend test coverage from 40% to 85%", "keywords_added": []}
  ],
  "ats_tips": ["Use a single-column layout", "Spell out acronyms once"]
}"#;

/// Wrap model text the way the Messages API does.
pub fn messages_body(text: &str) -> String {
    serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 1200, "output_tokens": 400}
    })
    .to_string()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

/// Serves one fixed response to every connection and records what it received.
pub struct StubServer {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn start(status: u16, body: impl Into<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = body.into();

        let conn_count = Arc::clone(&connections);
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                conn_count.fetch_add(1, Ordering::SeqCst);
                let _ = serve(stream, status, &body, &recorded);
            }
        });

        Self {
            base_url,
            connections,
            requests,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read one request and record it before answering.
fn serve(
    stream: TcpStream,
    status: u16,
    body: &str,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut head = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        if line == "\r\n" {
            break;
        }
        head.push_str(&line);
    }

    let length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    let mut raw_body = vec![0u8; length];
    reader.read_exact(&mut raw_body).ok()?;
    recorded.lock().unwrap().push(RecordedRequest {
        head,
        body: String::from_utf8_lossy(&raw_body).into_owned(),
    });

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let mut stream = stream;
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()
}

/// A port with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Completion client that counts calls and returns a canned reply.
pub struct CountingClient {
    reply: String,
    calls: AtomicUsize,
}

impl CountingClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionClient for CountingClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

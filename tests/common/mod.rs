//! In-memory transport serving canned CircleCI responses.

#![allow(dead_code)]

use circlesift::engine::{CancelToken, HttpRequest, HttpResponse, Transport};
use circlesift::{CircleCiSource, ClientOpts, Connection, ScanError, SourceConfig};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const API: &str = "https://circleci.com/api/v1.1";
pub const LOGS: &str = "https://circle-production-action-output.s3.amazonaws.com";
pub const TOKEN: &str = "test-token";

enum Canned {
    Status(u16, Vec<u8>),
    Fail(String),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Canned>,
    delay: Duration,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.routes
            .insert(url.into(), Canned::Status(200, body.into()));
        self
    }

    pub fn with_json(self, url: impl Into<String>, value: Value) -> Self {
        self.with_body(url, value.to_string())
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.routes
            .insert(url.into(), Canned::Status(status, Vec::new()));
        self
    }

    pub fn with_failure(mut self, url: impl Into<String>, reason: &str) -> Self {
        self.routes
            .insert(url.into(), Canned::Fail(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Register the project listing.
    pub fn with_projects(self, projects: &[(&str, &str, &str)]) -> Self {
        let list: Vec<Value> = projects
            .iter()
            .map(|(vcs, user, repo)| json!({"vcs_type": vcs, "username": user, "reponame": repo}))
            .collect();
        self.with_json(format!("{API}/projects"), Value::Array(list))
    }

    /// Register builds, steps and action logs of one project.
    /// Each action log is served at `{LOGS}/{log_name}`.
    pub fn with_tree(mut self, project: (&str, &str, &str), builds: &[BuildFixture]) -> Self {
        let (vcs, user, repo) = project;
        let nums: Vec<Value> = builds
            .iter()
            .map(|b| json!({"build_num": b.num, "status": "success"}))
            .collect();
        self = self.with_json(builds_url(project), Value::Array(nums));
        for b in builds {
            let steps: Vec<Value> = b
                .steps
                .iter()
                .map(|(name, actions)| {
                    let actions: Vec<Value> = actions
                        .iter()
                        .enumerate()
                        .map(|(i, (log, _))| json!({"index": i, "output_url": log_url(log)}))
                        .collect();
                    json!({"name": name, "actions": actions})
                })
                .collect();
            self = self.with_json(
                format!("{API}/project/{vcs}/{user}/{repo}/{}", b.num),
                json!({"build_num": b.num, "steps": steps}),
            );
            for (_, actions) in &b.steps {
                for (log, body) in actions {
                    self = self.with_body(log_url(log), body.as_bytes().to_vec());
                }
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, url: &str) -> bool {
        self.requests().iter().any(|r| r.url == url)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    fn get(
        &self,
        request: &HttpRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, ScanError> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        self.requests.lock().unwrap().push(RecordedRequest {
            url: request.url.to_string(),
            headers: request
                .headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.routes.get(request.url) {
            Some(Canned::Status(status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(Canned::Fail(reason)) => Err(ScanError::Transport {
                url: request.url.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: b"not found".to_vec(),
            }),
        }
    }
}

/// One build of a fixture tree: `steps` are `(step name, [(log name, log body)])`.
pub struct BuildFixture {
    pub num: u64,
    pub steps: Vec<(&'static str, Vec<(&'static str, &'static str)>)>,
}

pub fn build(num: u64, steps: Vec<(&'static str, Vec<(&'static str, &'static str)>)>) -> BuildFixture {
    BuildFixture { num, steps }
}

pub fn builds_url((vcs, user, repo): (&str, &str, &str)) -> String {
    format!("{API}/project/{vcs}/{user}/{repo}")
}

pub fn steps_url((vcs, user, repo): (&str, &str, &str), num: u64) -> String {
    format!("{API}/project/{vcs}/{user}/{repo}/{num}")
}

pub fn log_url(name: &str) -> String {
    format!("{LOGS}/{name}")
}

pub fn config(concurrency: usize) -> SourceConfig {
    SourceConfig {
        name: "circleci-test".to_string(),
        job_id: 7,
        source_id: 3,
        verify: true,
        connection: Connection::with_token(TOKEN),
        concurrency,
    }
}

pub fn source(transport: &Arc<FakeTransport>, concurrency: usize) -> CircleCiSource {
    CircleCiSource::with_transport(
        config(concurrency),
        &ClientOpts::default(),
        Arc::clone(transport) as Arc<dyn Transport>,
    )
    .unwrap()
}

/// Local HTTP/1.1 server answering each connection with the next scripted status.
/// The last status repeats once the script runs out.
pub struct ScriptedServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl ScriptedServer {
    pub fn start(script: &[(u16, &'static str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let script = script.to_vec();
        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = script[n.min(script.len() - 1)];
                read_request_head(&stream);
                let _ = write!(
                    stream,
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.flush();
            }
        });
        Self { base_url, hits }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Accepts connections and never answers them. Returns the base URL.
pub fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            held.push(stream);
        }
    });
    base_url
}

fn read_request_head(stream: &TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
        if line == "\r\n" {
            break;
        }
        line.clear();
    }
}

pub fn local_opts(base_url: &str, retry_attempts: u32, timeout_secs: u64) -> ClientOpts {
    ClientOpts {
        base_url: base_url.to_string(),
        retry_attempts,
        timeout_secs,
        ..ClientOpts::default()
    }
}

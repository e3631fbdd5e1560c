//! HTTP GET capability with transparent retries for transient failures.

use crossbeam_channel::{bounded, select};
use log::debug;
use std::thread;
use std::time::Duration;

use crate::engine::cancel::CancelToken;
use crate::error::ScanError;
use crate::types::ClientOpts;
use crate::utils::config::ApiDefaults;

/// A single GET with its headers.
#[derive(Debug)]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    pub headers: Vec<(&'static str, &'a str)>,
}

/// Status and full body of a completed GET.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 2xx and 3xx are accepted; redirects are followed by the transport.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Perform a GET, returning status and body. Implementations may retry transient
/// failures but must return [`ScanError::Cancelled`] promptly once `cancel` fires,
/// including while a request is in flight.
pub trait Transport: Send + Sync {
    fn get(&self, request: &HttpRequest<'_>, cancel: &CancelToken)
    -> Result<HttpResponse, ScanError>;
}

/// Blocking `reqwest` client retrying connection errors, timeouts, 429 and 5xx.
pub struct RetryingClient {
    client: reqwest::blocking::Client,
    attempts: u32,
    backoff_base: Duration,
}

impl RetryingClient {
    pub fn new(opts: &ClientOpts) -> Result<Self, ScanError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(opts.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScanError::Config(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            attempts: opts.retry_attempts.max(1),
            backoff_base: Duration::from_millis(ApiDefaults::BACKOFF_BASE_MS),
        })
    }

    /// One GET on a helper thread, raced against `cancel`. A cancelled request is left to
    /// finish or time out on its own; its result is discarded.
    fn attempt(
        &self,
        request: &HttpRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<Result<HttpResponse, reqwest::Error>, ScanError> {
        let client = self.client.clone();
        let url = request.url.to_string();
        let headers: Vec<(&'static str, String)> = request
            .headers
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        let (done_tx, done_rx) = bounded(1);
        thread::Builder::new()
            .name("http-get".to_string())
            .spawn(move || {
                let _ = done_tx.send(send_get(&client, &url, &headers));
            })
            .map_err(|e| ScanError::Transport {
                url: request.url.to_string(),
                reason: format!("spawn request thread: {e}"),
            })?;
        select! {
            recv(done_rx) -> outcome => outcome.map_err(|_| ScanError::Transport {
                url: request.url.to_string(),
                reason: "request thread exited without a result".to_string(),
            }),
            recv(cancel.closed()) -> _ => Err(ScanError::Cancelled),
        }
    }
}

fn send_get(
    client: &reqwest::blocking::Client,
    url: &str,
    headers: &[(&'static str, String)],
) -> Result<HttpResponse, reqwest::Error> {
    let mut builder = client.get(url);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }
    let res = builder.send()?;
    let status = res.status().as_u16();
    let body = res.bytes()?.to_vec();
    Ok(HttpResponse { status, body })
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

impl Transport for RetryingClient {
    fn get(
        &self,
        request: &HttpRequest<'_>,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, ScanError> {
        let mut delay = self.backoff_base;
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let outcome = self.attempt(request, cancel)?;
            let retryable = match &outcome {
                Ok(res) => is_retryable_status(res.status),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if !retryable || attempt >= self.attempts {
                return outcome.map_err(|e| ScanError::Transport {
                    url: request.url.to_string(),
                    reason: e.to_string(),
                });
            }
            debug!(
                "GET {} attempt {}/{} failed, retrying in {:?}",
                request.url, attempt, self.attempts, delay
            );
            if cancel.wait_timeout(delay) {
                return Err(ScanError::Cancelled);
            }
            delay *= 2;
            attempt += 1;
        }
    }
}

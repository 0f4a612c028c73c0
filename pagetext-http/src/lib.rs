//! Minimal HTTP client for fetching a single page with safe logging.
//!
//! - One GET per call: fixed `User-Agent`, hard timeout, no retries
//! - Redirects follow the `reqwest` default policy
//! - Transport failures are classified into timeout / connect / other
//! - Optional *raw* request/response logging via `PAGETEXT_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), pagetext_http::HttpError> {
//! let client = pagetext_http::HttpClient::new(pagetext_http::HttpOptions::default())?;
//! let url = pagetext_http::Url::parse("https://example.com").unwrap();
//! let page = client.get_page(&url).await?;
//! println!("{} {:?}", page.status, page.content_type);
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (trace level), transport errors, and
//! (optionally) raw request/response lines on target `http.raw`.

use bytes::Bytes;
use pagetext_common::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use reqwest::{StatusCode, Url};

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "PAGETEXT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "proxy-authorization"];

fn is_sensitive(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|s| name.eq_ignore_ascii_case(s))
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), "-XGET".to_string()];
    for (name, val) in headers.iter() {
        let v = if is_sensitive(name.as_str()) {
            "<redacted>".to_string()
        } else {
            val.to_str().unwrap_or("").to_string()
        };
        parts.push(format!(
            "-H '{}: {}'",
            name.as_str(),
            v.replace('\'', r"'\''")
        ));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_sensitive(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("client build failed: {0}")]
    Build(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Network(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        // connect timeouts report both flags; the timeout wins
        if err.is_timeout() {
            HttpError::Timeout(message)
        } else if err.is_connect() {
            HttpError::Connect(message)
        } else {
            HttpError::Network(message)
        }
    }
}

/// `reqwest` keeps the interesting part (DNS, TLS, refused) in the source chain.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(src) = cur {
        let s = src.to_string();
        if !out.contains(&s) {
            out.push_str(": ");
            out.push_str(&s);
        }
        cur = src.source();
    }
    out
}

// ==============================
// Client
// ==============================

/// Construction options for [`HttpClient`].
///
/// ```
/// use pagetext_http::HttpOptions;
/// use std::time::Duration;
///
/// let opts = HttpOptions::default();
/// assert_eq!(opts.timeout, Duration::from_secs(10));
/// assert!(opts.user_agent.starts_with("Mozilla/5.0"));
/// ```
#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// What came back from a single page request.
#[derive(Clone, Debug)]
pub struct PageResponse {
    pub status: StatusCode,
    /// Raw `Content-Type` header value, if the server sent one.
    pub content_type: Option<String>,
    pub body: Bytes,
    /// URL after any redirects the transport followed.
    pub final_url: Url,
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: HeaderValue,
    pub timeout: Duration,
}

impl HttpClient {
    /// Build a client that sends `opts.user_agent` and aborts after `opts.timeout`.
    ///
    /// ```
    /// use pagetext_http::{HttpClient, HttpError, HttpOptions};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new(HttpOptions {
    ///     timeout: Duration::from_secs(2),
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(client.timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(opts: HttpOptions) -> Result<Self, HttpError> {
        let user_agent = HeaderValue::from_str(&opts.user_agent)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        let inner = Client::builder()
            .user_agent(user_agent.clone())
            .timeout(opts.timeout)
            .build()
            .map_err(|e| HttpError::Build(error_chain(&e)))?;
        Ok(Self {
            inner,
            user_agent,
            timeout: opts.timeout,
        })
    }

    /// Issue exactly one GET for `url` and read the whole body.
    ///
    /// Any HTTP status is returned as `Ok`; judging it is the caller's job.
    pub async fn get_page(&self, url: &Url) -> Result<PageResponse, HttpError> {
        // Lightweight request id without extra deps
        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        tracing::debug!(
            req_id=%req_id,
            method="GET",
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=self.timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let mut sent = HeaderMap::new();
            sent.insert(USER_AGENT, self.user_agent.clone());
            let curl = make_curl(url, &sent);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let t0 = Instant::now();
        let resp = match self.inner.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(err) => return Err(log_failure(&req_id, "send", err.into())),
        };

        let status = resp.status();
        let final_url = resp.url().clone();
        let headers = resp.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        let body = match resp.bytes().await {
            Ok(body) => body,
            Err(err) => return Err(log_failure(&req_id, "body", err.into())),
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=body.len(),
            content_type=?content_type,
            redirected=%(final_url != *url),
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = body.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&body[..body.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&body),
            "http.response.body_snippet"
        );

        Ok(PageResponse {
            status,
            content_type,
            body,
            final_url,
        })
    }
}

fn log_failure(req_id: &str, stage: &'static str, err: HttpError) -> HttpError {
    let kind = match &err {
        HttpError::Build(_) => "build",
        HttpError::Timeout(_) => "timeout",
        HttpError::Connect(_) => "connect",
        HttpError::Network(_) => "network",
    };
    tracing::warn!(
        req_id=%req_id,
        stage,
        kind,
        message=%err,
        "http.network_error"
    );
    err
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(&body[..body.len().min(SNIPPET_MAX)]).into_owned();
    if body.len() > SNIPPET_MAX {
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, COOKIE};

    #[test]
    fn curl_redacts_sensitive_headers() {
        let url = Url::parse("https://example.com/a?b=c").unwrap();
        let mut h = HeaderMap::new();
        h.insert(USER_AGENT, HeaderValue::from_static("ua/1"));
        h.insert(COOKIE, HeaderValue::from_static("session=abc"));
        let curl = make_curl(&url, &h);
        assert!(curl.starts_with("curl -XGET"));
        assert!(curl.contains("-H 'user-agent: ua/1'"));
        assert!(curl.contains("cookie: <redacted>"));
        assert!(!curl.contains("abc"));
        assert!(curl.ends_with("'https://example.com/a?b=c'"));
    }

    #[test]
    fn redact_headers_hides_authorization() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        h.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        let out = redact_headers(&h);
        assert!(out.contains(&("authorization".into(), "<redacted>".into())));
        assert!(out.contains(&("content-type".into(), "text/html".into())));
    }

    #[test]
    fn snippet_is_capped() {
        let body = "x".repeat(2_000);
        let snip = snip_body(body.as_bytes());
        assert_eq!(snip.len(), SNIPPET_MAX + 3);
        assert!(snip.ends_with("..."));
        assert_eq!(snip_body(b"short"), "short");
    }

    #[test]
    fn rejects_unprintable_user_agent() {
        let err = HttpClient::new(HttpOptions {
            user_agent: "bad\nagent".into(),
            ..Default::default()
        })
        .err()
        .expect("build must fail");
        assert!(matches!(err, HttpError::Build(_)));
    }
}

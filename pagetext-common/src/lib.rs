//! Common types and utilities shared across pagetext crates.
//!
//! This crate defines the request/outcome model of a single extraction and
//! the observability helpers used by every binary. It is intentionally
//! lightweight so that all crates can depend on it without pulling in the
//! HTTP or HTML stacks.
//!
//! # Overview
//!
//! - [`FetchRequest`]: the URL a caller wants extracted
//! - [`PageText`]: extracted text together with its character count
//! - [`FetchOutcome`] and [`ErrorKind`]: the tagged result of one extraction
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use pagetext_common::{ErrorKind, FetchOutcome, PageText};
//!
//! let ok = FetchOutcome::Success(PageText::new("héllo".to_string()));
//! assert!(ok.is_success());
//! assert_eq!(ok.kind(), None);
//!
//! let failed = FetchOutcome::failure(ErrorKind::NoContent, "error: no valid text content found");
//! assert_eq!(failed.kind(), Some(ErrorKind::NoContent));
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub mod observability;

/// Browser-identifying User-Agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Hard per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// File name offered for the downloadable text artifact.
pub const DEFAULT_ARTIFACT_NAME: &str = "webpage_content.txt";

/// A single extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Parse the request URL, accepting only absolute URLs with a host.
    ///
    /// The input must spell out the `//` authority marker after the scheme;
    /// forms such as `http:example.com` are rejected even though a lenient
    /// parser would recover a host from them.
    ///
    /// ```
    /// use pagetext_common::FetchRequest;
    ///
    /// assert!(FetchRequest::new("https://example.com/a").parse_url().is_some());
    /// assert!(FetchRequest::new("example.com").parse_url().is_none());
    /// assert!(FetchRequest::new("http://").parse_url().is_none());
    /// assert!(FetchRequest::new("http:example.com").parse_url().is_none());
    /// assert!(FetchRequest::new("mailto:someone@example.com").parse_url().is_none());
    /// ```
    pub fn parse_url(&self) -> Option<Url> {
        let raw = self.url.trim();
        let (_, rest) = raw.split_once(':')?;
        if !rest.starts_with("//") {
            return None;
        }
        let url = Url::parse(raw).ok()?;
        if url.scheme().is_empty() {
            return None;
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => Some(url),
            _ => None,
        }
    }
}

/// Plain text extracted from a page.
///
/// `length` is always the number of characters (Unicode scalar values) in
/// `text`; the fields are private so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    text: String,
    length: usize,
}

impl PageText {
    pub fn new(text: String) -> Self {
        let length = text.chars().count();
        Self { text, length }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// First `max_chars` characters, with `...` appended when the text is longer.
    ///
    /// ```
    /// use pagetext_common::PageText;
    ///
    /// let page = PageText::new("abcdef".to_string());
    /// assert_eq!(page.preview(3), "abc...");
    /// assert_eq!(page.preview(6), "abcdef");
    /// ```
    pub fn preview(&self, max_chars: usize) -> String {
        if self.length <= max_chars {
            return self.text.clone();
        }
        let mut out: String = self.text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

/// Classification of a failed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    Timeout,
    ConnectionError,
    BadStatus,
    UnsupportedContentType,
    NoContent,
    RequestError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::BadStatus => "bad_status",
            ErrorKind::UnsupportedContentType => "unsupported_content_type",
            ErrorKind::NoContent => "no_content",
            ErrorKind::RequestError => "request_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged result of one extraction. Every failure is terminal for the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Success(PageText),
    Failure { kind: ErrorKind, message: String },
}

impl FetchOutcome {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// Failure kind, or `None` on success.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn into_result(self) -> Result<PageText, (ErrorKind, String)> {
        match self {
            FetchOutcome::Success(page) => Ok(page),
            FetchOutcome::Failure { kind, message } => Err((kind, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters_not_bytes() {
        let page = PageText::new("网页文本".to_string());
        assert_eq!(page.length(), 4);
        assert_eq!(page.text().len(), 12);
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let page = PageText::new("网页文本内容".to_string());
        assert_eq!(page.preview(2), "网页...");
    }

    #[test]
    fn rejects_urls_without_host() {
        for raw in ["", "   ", "not a url", "/relative/path", "file:///etc/hosts", "http://"] {
            assert!(FetchRequest::new(raw).parse_url().is_none(), "{raw:?}");
        }
    }

    #[test]
    fn rejects_urls_missing_authority_marker() {
        for raw in ["http:example.com", "http:/example.com", "https:\\\\example.com"] {
            assert!(FetchRequest::new(raw).parse_url().is_none(), "{raw:?}");
        }
    }

    #[test]
    fn accepts_authority_with_surrounding_whitespace_and_upper_scheme() {
        let url = FetchRequest::new("  HTTP://Example.com/a  ").parse_url().unwrap();
        assert_eq!(url.as_str(), "http://example.com/a");
    }

    #[test]
    fn into_result_splits_outcome() {
        let page = FetchOutcome::Success(PageText::new("body".into()))
            .into_result()
            .unwrap();
        assert_eq!(page.into_text(), "body");

        let (kind, message) = FetchOutcome::failure(ErrorKind::Timeout, "slow")
            .into_result()
            .unwrap_err();
        assert_eq!(kind, ErrorKind::Timeout);
        assert_eq!(message, "slow");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let ok = FetchOutcome::Success(PageText::new("hi".into()));
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["text"], "hi");
        assert_eq!(v["length"], 2);

        let failed = FetchOutcome::failure(ErrorKind::BadStatus, "error: request failed, status=404");
        let v = serde_json::to_value(&failed).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["kind"], "bad_status");
    }
}

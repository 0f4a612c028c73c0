//! Fetch one page and turn it into plain text.
//!
//! [`PageTextExtractor::extract`] is a single linear pass with early exits:
//! validate URL, GET, status check, content-type check, decode, strip markup,
//! normalise, empty check. Every failure becomes an [`ExtractError`], and
//! through it a tagged [`FetchOutcome`]; nothing escapes as a panic or an
//! untyped error.

use crate::extract::{decode_body, html_to_text};
use pagetext_common::{ErrorKind, FetchOutcome, FetchRequest, PageText};
use pagetext_http::{HttpClient, HttpError, HttpOptions, StatusCode};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use url::Url;

/// Why an extraction failed. `Display` is the user-visible message.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("error: invalid URL format")]
    InvalidUrl,
    #[error("error: request timed out, check the network connection or retry later")]
    Timeout(String),
    #[error("error: cannot connect to server, check the network connection")]
    Connection(String),
    #[error("error: request failed, status={0}")]
    BadStatus(u16),
    #[error("error: unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("error: no valid text content found")]
    NoContent,
    #[error("request error: {0}")]
    Request(String),
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::InvalidUrl => ErrorKind::InvalidUrl,
            ExtractError::Timeout(_) => ErrorKind::Timeout,
            ExtractError::Connection(_) => ErrorKind::ConnectionError,
            ExtractError::BadStatus(_) => ErrorKind::BadStatus,
            ExtractError::UnsupportedContentType(_) => ErrorKind::UnsupportedContentType,
            ExtractError::NoContent => ErrorKind::NoContent,
            ExtractError::Request(_) => ErrorKind::RequestError,
            ExtractError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Transport detail behind the message, when there is one.
    fn detail(&self) -> Option<&str> {
        match self {
            ExtractError::Timeout(d)
            | ExtractError::Connection(d)
            | ExtractError::Request(d)
            | ExtractError::Unknown(d) => Some(d),
            _ => None,
        }
    }
}

impl From<HttpError> for ExtractError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(m) => ExtractError::Timeout(m),
            HttpError::Connect(m) => ExtractError::Connection(m),
            HttpError::Network(m) => ExtractError::Request(m),
            HttpError::Build(m) => ExtractError::Unknown(m),
        }
    }
}

impl From<ExtractError> for FetchOutcome {
    fn from(err: ExtractError) -> Self {
        FetchOutcome::failure(err.kind(), err.to_string())
    }
}

/// Convert the `?`-friendly result into the tagged outcome.
pub fn into_outcome(result: Result<PageText, ExtractError>) -> FetchOutcome {
    match result {
        Ok(page) => FetchOutcome::Success(page),
        Err(err) => err.into(),
    }
}

/// Stateless apart from the reusable HTTP client; clone freely.
#[derive(Clone)]
pub struct PageTextExtractor {
    client: HttpClient,
}

impl PageTextExtractor {
    pub fn new(opts: HttpOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            client: HttpClient::new(opts)?,
        })
    }

    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }

    /// Extract the text of `url`, never failing outright.
    pub async fn extract(&self, url: &str) -> FetchOutcome {
        into_outcome(self.try_extract(url).await)
    }

    /// Same pipeline as [`extract`](Self::extract), as a `Result`.
    pub async fn try_extract(&self, url: &str) -> Result<PageText, ExtractError> {
        tracing::info!(%url, "extract.start");
        let result = self.run(url).await;
        match &result {
            Ok(page) => tracing::info!(%url, length = page.length(), "extract.done"),
            Err(err) => tracing::warn!(
                %url,
                kind = %err.kind(),
                message = %err,
                detail = ?err.detail(),
                "extract.failed"
            ),
        }
        result
    }

    async fn run(&self, url: &str) -> Result<PageText, ExtractError> {
        let parsed = FetchRequest::new(url)
            .parse_url()
            .ok_or(ExtractError::InvalidUrl)?;

        let resp = self.client.get_page(&parsed).await?;

        if resp.status != StatusCode::OK {
            return Err(ExtractError::BadStatus(resp.status.as_u16()));
        }

        let content_type = resp.content_type.unwrap_or_default().to_lowercase();
        if !content_type.contains("text/html") {
            return Err(ExtractError::UnsupportedContentType(content_type));
        }

        let html = decode_body(&resp.body, tld_hint(&resp.final_url));
        let text = panic::catch_unwind(AssertUnwindSafe(|| html_to_text(&html)))
            .map_err(|payload| ExtractError::Unknown(panic_message(payload.as_ref())))?;

        if text.trim().is_empty() {
            return Err(ExtractError::NoContent);
        }
        Ok(PageText::new(text))
    }
}

fn tld_hint(url: &Url) -> Option<&str> {
    url.domain()?.rsplit('.').next()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extraction panicked".to_string()
    }
}

/// Extract with default request settings (browser User-Agent, 10 s timeout).
pub async fn extract(url: &str) -> FetchOutcome {
    match PageTextExtractor::new(HttpOptions::default()) {
        Ok(extractor) => extractor.extract(url).await,
        Err(err) => err.into(),
    }
}

/// Synchronous front for callers without an async runtime.
///
/// Owns a current-thread runtime; each call blocks the calling thread for at
/// most the configured timeout. Must not be called from inside another
/// tokio runtime.
pub struct BlockingExtractor {
    inner: PageTextExtractor,
    runtime: Runtime,
}

impl BlockingExtractor {
    pub fn new(opts: HttpOptions) -> Result<Self, ExtractError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name("pagetext-blocking")
            .build()
            .map_err(|e| ExtractError::Unknown(format!("runtime build failed: {e}")))?;
        Ok(Self {
            inner: PageTextExtractor::new(opts)?,
            runtime,
        })
    }

    pub fn extract(&self, url: &str) -> FetchOutcome {
        self.runtime.block_on(self.inner.extract(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_expected_prefixes() {
        let cases = [
            (ExtractError::InvalidUrl, "error: invalid URL format"),
            (ExtractError::Timeout("x".into()), "error: request timed out"),
            (ExtractError::Connection("x".into()), "error: cannot connect to server"),
            (ExtractError::BadStatus(404), "error: request failed, status=404"),
            (
                ExtractError::UnsupportedContentType("application/json".into()),
                "error: unsupported content type: application/json",
            ),
            (ExtractError::NoContent, "error: no valid text content found"),
            (ExtractError::Request("boom".into()), "request error: boom"),
            (ExtractError::Unknown("boom".into()), "unknown error: boom"),
        ];
        for (err, prefix) in cases {
            assert!(err.to_string().starts_with(prefix), "{err} !~ {prefix}");
        }
    }

    #[test]
    fn http_errors_map_onto_kinds() {
        let kind = |e: HttpError| ExtractError::from(e).kind();
        assert_eq!(kind(HttpError::Timeout("t".into())), ErrorKind::Timeout);
        assert_eq!(kind(HttpError::Connect("c".into())), ErrorKind::ConnectionError);
        assert_eq!(kind(HttpError::Network("n".into())), ErrorKind::RequestError);
        assert_eq!(kind(HttpError::Build("b".into())), ErrorKind::Unknown);
    }

    #[test]
    fn outcome_keeps_kind_and_message() {
        let outcome = into_outcome(Err(ExtractError::BadStatus(500)));
        assert_eq!(
            outcome,
            FetchOutcome::failure(ErrorKind::BadStatus, "error: request failed, status=500")
        );
    }

    #[test]
    fn tld_hint_skips_ip_hosts() {
        assert_eq!(tld_hint(&Url::parse("https://news.example.cn/a").unwrap()), Some("cn"));
        assert_eq!(tld_hint(&Url::parse("http://127.0.0.1:8080/").unwrap()), None);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn Any + Send> = Box::new("bad tree");
        assert_eq!(panic_message(payload.as_ref()), "bad tree");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
    }
}

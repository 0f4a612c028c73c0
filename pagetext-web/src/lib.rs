//! Web page acquisition and text extraction.
//!
//! - [`PageTextExtractor`] fetches one URL and returns a tagged [`FetchOutcome`]
//! - [`BlockingExtractor`] wraps it for synchronous callers
//! - [`extract`](mod@extract) holds the pure decoding/stripping/normalisation steps
//!
//! ```no_run
//! # async fn demo() {
//! use pagetext_web::{FetchOutcome, PageTextExtractor};
//! use pagetext_http::HttpOptions;
//!
//! let extractor = PageTextExtractor::new(HttpOptions::default()).unwrap();
//! match extractor.extract("https://example.com").await {
//!     FetchOutcome::Success(page) => println!("{} chars", page.length()),
//!     FetchOutcome::Failure { kind, message } => eprintln!("{kind}: {message}"),
//! }
//! # }
//! ```

pub mod extract;
mod extractor;

pub use extractor::{
    BlockingExtractor, ExtractError, PageTextExtractor, extract, into_outcome,
};
pub use pagetext_common::{ErrorKind, FetchOutcome, FetchRequest, PageText};

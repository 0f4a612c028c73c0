//! Terminal rendering of an extraction outcome and the downloadable artifact.

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use pagetext_common::{FetchOutcome, PageText};
use std::io::Write;
use std::path::PathBuf;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILED: u8 = 1;

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub preview_chars: usize,
    /// Artifact path; `None` skips writing.
    pub output: Option<PathBuf>,
    pub json: bool,
    pub data_uri: bool,
}

/// Print `outcome`, write the artifact on success, and return the exit code.
pub fn present(
    outcome: &FetchOutcome,
    settings: &ReportSettings,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<u8> {
    if settings.json {
        let mut doc = serde_json::to_value(outcome)?;
        if let (FetchOutcome::Success(page), true) = (outcome, settings.data_uri) {
            doc["data_uri"] = data_uri(page.text()).into();
        }
        writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    }

    let page = match outcome {
        FetchOutcome::Success(page) => page,
        FetchOutcome::Failure { kind, message } => {
            tracing::debug!(%kind, "reporting failure");
            if !settings.json {
                writeln!(err, "{message}")?;
            }
            return Ok(EXIT_FAILED);
        }
    };

    if !settings.json {
        write_summary(page, settings.preview_chars, out)?;
    }

    if let Some(path) = &settings.output {
        std::fs::write(path, page.text().as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = page.text().len(), "artifact.saved");
        if !settings.json {
            writeln!(out, "saved to {}", path.display())?;
        }
    }

    if settings.data_uri && !settings.json {
        writeln!(out, "{}", data_uri(page.text()))?;
    }

    Ok(EXIT_OK)
}

fn write_summary(page: &PageText, preview_chars: usize, out: &mut impl Write) -> Result<()> {
    writeln!(out, "extraction complete")?;
    writeln!(out)?;
    writeln!(out, "content preview:")?;
    writeln!(out, "{}", page.preview(preview_chars))?;
    writeln!(out)?;
    writeln!(out, "total length: {} characters", page.length())?;
    Ok(())
}

/// The text as an inline `data:` URI, ready to embed in a download link.
pub fn data_uri(text: &str) -> String {
    format!("data:file/txt;base64,{}", STANDARD.encode(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagetext_common::ErrorKind;

    fn settings(output: Option<PathBuf>) -> ReportSettings {
        ReportSettings {
            preview_chars: 5,
            output,
            json: false,
            data_uri: false,
        }
    }

    fn run(outcome: &FetchOutcome, s: &ReportSettings) -> (u8, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = present(outcome, s, &mut out, &mut err).unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn success_prints_preview_length_and_saves_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webpage_content.txt");
        let outcome = FetchOutcome::Success(PageText::new("Hello\nWorld".into()));

        let (code, out, err) = run(&outcome, &settings(Some(path.clone())));

        assert_eq!(code, EXIT_OK);
        assert!(err.is_empty());
        assert!(out.contains("content preview:\nHello...\n"));
        assert!(out.contains("total length: 11 characters"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello\nWorld");
    }

    #[test]
    fn short_text_preview_has_no_ellipsis() {
        let outcome = FetchOutcome::Success(PageText::new("Hi".into()));
        let (_, out, _) = run(&outcome, &settings(None));
        assert!(out.contains("content preview:\nHi\n"));
        assert!(!out.contains("saved to"));
    }

    #[test]
    fn failure_goes_to_stderr_with_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.txt");
        let outcome =
            FetchOutcome::failure(ErrorKind::BadStatus, "error: request failed, status=404");

        let (code, out, err) = run(&outcome, &settings(Some(path.clone())));

        assert_eq!(code, EXIT_FAILED);
        assert!(out.is_empty());
        assert_eq!(err, "error: request failed, status=404\n");
        assert!(!path.exists());
    }

    #[test]
    fn json_mode_prints_tagged_outcome() {
        let outcome = FetchOutcome::failure(ErrorKind::NoContent, "error: no valid text content found");
        let s = ReportSettings {
            json: true,
            ..settings(None)
        };
        let (code, out, err) = run(&outcome, &s);
        assert_eq!(code, EXIT_FAILED);
        assert!(err.is_empty());
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["kind"], "no_content");
    }

    #[test]
    fn data_uri_encodes_raw_text_bytes() {
        assert_eq!(data_uri("hi"), "data:file/txt;base64,aGk=");
        let outcome = FetchOutcome::Success(PageText::new("hi".into()));
        let s = ReportSettings {
            data_uri: true,
            ..settings(None)
        };
        let (_, out, _) = run(&outcome, &s);
        assert!(out.trim_end().ends_with("data:file/txt;base64,aGk="));
    }

    #[test]
    fn json_mode_embeds_data_uri_in_the_document() {
        let outcome = FetchOutcome::Success(PageText::new("hi".into()));
        let s = ReportSettings {
            json: true,
            data_uri: true,
            ..settings(None)
        };
        let (code, out, _) = run(&outcome, &s);
        assert_eq!(code, EXIT_OK);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["text"], "hi");
        assert_eq!(v["data_uri"], "data:file/txt;base64,aGk=");
    }
}

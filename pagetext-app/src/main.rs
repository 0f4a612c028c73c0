use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use pagetext_common::observability::init_logging;
use pagetext_config::{PagetextConfig, PagetextConfigLoader, default_config_path};
use pagetext_http::HttpOptions;
use pagetext_web::{FetchOutcome, PageTextExtractor};
use report::{ReportSettings, present};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
mod cli;
mod report;

const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if cli.url.trim().is_empty() {
        eprintln!("error: please enter a valid web page URL");
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    // Config (env wins), then logging from its `logging` section
    let cfg = load_config(cli.config.as_deref())?;
    let log_path = init_logging(cfg.logging.to_log_config())?;
    tracing::debug!(log = %log_path.display(), "logging initialised");

    let opts = HttpOptions {
        user_agent: cfg.fetch.user_agent.clone(),
        timeout: cli
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| cfg.fetch.timeout()),
    };
    let outcome: FetchOutcome = match PageTextExtractor::new(opts) {
        Ok(extractor) => extractor.extract(&cli.url).await,
        Err(err) => err.into(),
    };

    let settings = report_settings(&cli, &cfg);
    let code = present(
        &outcome,
        &settings,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;
    Ok(ExitCode::from(code))
}

fn load_config(explicit: Option<&Path>) -> Result<PagetextConfig> {
    let loader = match explicit {
        Some(path) => PagetextConfigLoader::new().with_file(path),
        None => {
            let mut loader = PagetextConfigLoader::new();
            if let Some(user) = default_config_path() {
                loader = loader.with_optional_file(user);
            }
            loader.with_optional_file("pagetext.yaml")
        }
    };
    loader
        .load()
        .context("failed to load pagetext configuration")
}

fn report_settings(cli: &Cli, cfg: &PagetextConfig) -> ReportSettings {
    let output = if cli.no_save {
        None
    } else {
        Some(
            cli.output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.output.file_name)),
        )
    };
    ReportSettings {
        preview_chars: cli.preview.unwrap_or(cfg.output.preview_chars),
        output,
        json: cli.json,
        data_uri: cli.data_uri,
    }
}

use clap::Parser;
use std::path::PathBuf;

/// Fetch a web page and save its plain text.
#[derive(Debug, Parser)]
#[command(name = "pagetext", version, about)]
pub struct Cli {
    /// Web page to extract (absolute http/https URL).
    pub url: String,

    /// Configuration file; defaults to the user config dir, then ./pagetext.yaml.
    #[arg(long, env = "PAGETEXT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where to write the text file (defaults to `output.file_name`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only show the preview; do not write a file.
    #[arg(long, conflicts_with = "output")]
    pub no_save: bool,

    /// Preview length in characters.
    #[arg(long)]
    pub preview: Option<usize>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also print the text as a base64 `data:` URI.
    #[arg(long)]
    pub data_uri: bool,
}

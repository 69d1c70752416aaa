use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use sift::config::Config;
use sift::feed::{self, build_client, fetch_document};
use sift::outline;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// The full model as JSON
    Json,
    /// Indented plain-text summary
    Outline,
}

#[derive(Parser, Debug)]
#[command(name = "sift", version, about = "Normalize RSS 2.0 and Atom feeds")]
struct Args {
    /// Feed URL (http/https) or path to a local file
    source: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Outline)]
    format: Format,

    /// Config file (default: ~/.config/sift/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Proxy URL for all requests
    #[arg(long, value_name = "URL", conflicts_with = "no_proxy")]
    proxy: Option<String>,

    /// Ignore configured and environment proxies
    #[arg(long)]
    no_proxy: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log parser decisions (same as RUST_LOG=sift=debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Command-line flags take precedence over the config file.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
            config.no_proxy = false;
        }
        if self.no_proxy {
            config.no_proxy = true;
            config.proxy = None;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

async fn read_source(source: &str, config: &Config) -> Result<String> {
    if is_remote(source) {
        let client = build_client(config).context("Failed to build HTTP client")?;
        return fetch_document(&client, source, config)
            .await
            .with_context(|| format!("Failed to fetch '{source}'"));
    }

    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read '{source}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::new("sift=debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    args.apply_overrides(&mut config);
    tracing::debug!(?config, "Effective configuration");

    let content = read_source(&args.source, &config).await?;
    let document =
        feed::parse(&content).with_context(|| format!("Failed to parse '{}'", args.source))?;

    match args.format {
        Format::Json => {
            let json =
                serde_json::to_string_pretty(&document).context("Failed to serialize document")?;
            println!("{json}");
        }
        Format::Outline => print!("{}", outline::render(&document)),
    }

    Ok(())
}

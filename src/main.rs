//! Command-line front end for the design-file API client.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use figma_client::config::{load_config, loader::apply_env, validate_config, ClientConfig};
use figma_client::observability::logging;
use figma_client::{FigmaClient, FileOptions};

#[derive(Parser)]
#[command(name = "figma-cli")]
#[command(about = "Query the design-file API through the rate-limited client", long_about = None)]
struct Cli {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Personal access token (overrides config and FIGMA_API_KEY).
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// API root URL.
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a file document
    File {
        /// File key from the file URL
        key: String,
        /// Document traversal depth
        #[arg(long)]
        depth: Option<u32>,
        /// Version id
        #[arg(long)]
        version: Option<String>,
        /// Comma-separated node ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },
    /// Show the authenticated user
    Me,
    /// Check the configured API key
    Validate,
    /// Show rate limit and cache state
    Status,
}

#[derive(Serialize)]
struct Status {
    transport: figma_client::transport::TransportKind,
    rate_limit: figma_client::rate_limit::RateLimitSnapshot,
    cache: figma_client::cache::CacheStats,
}

fn build_config(cli: &Cli) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = ClientConfig::default();
            apply_env(&mut config);
            config
        }
    };

    if let Some(key) = &cli.api_key {
        config.api.api_key = key.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    validate_config(&config).map_err(|errors| {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    })?;

    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    logging::init(&config.observability.log_level);

    let client = FigmaClient::new(config)?;
    tracing::info!(transport = ?client.transport_kind(), "figma-cli starting");

    let outcome = match cli.command {
        Commands::File {
            key,
            depth,
            version,
            ids,
        } => {
            let options = FileOptions {
                depth,
                version,
                ids,
                ..Default::default()
            };
            match client.get_file(&key, options).await {
                Ok(file) => print_json(&file),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Me => match client.get_user().await {
            Ok(user) => print_json(&user),
            Err(e) => Err(e.into()),
        },
        Commands::Validate => print_json(&client.validate_api_key().await),
        Commands::Status => print_json(&Status {
            transport: client.transport_kind(),
            rate_limit: client.rate_limit_status(),
            cache: client.cache_stats(),
        }),
    };

    client.destroy();
    outcome
}

//! comicshelf - list the latest comics from the Marvel catalog
//!
//! Fetches the first page of comics through the in-memory cache and prints
//! either a summary or the raw JSON response.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use comicshelf::cli::{Cli, OutputFormat, StartupConfig};
use comicshelf::{ComicsCache, ComicsClient, ComicsResponse};

/// Sets up tracing output on stderr so stdout only carries results
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Prints one line per comic followed by the attribution
fn print_summary(response: &ComicsResponse) {
    let data = &response.data;
    println!(
        "{} {} (showing {} of {})",
        response.code, response.status, data.count, data.total
    );
    for comic in &data.results {
        println!("#{} {}", comic.id, comic.title);
    }
    if !response.attribution_text.is_empty() {
        println!();
        println!("{}", response.attribution_text);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = StartupConfig::from_cli(&cli);
    init_logging(config.log_level);

    if config.client.credentials.public_key.is_empty() {
        tracing::warn!("no public key configured, the request will be rejected");
    }

    let client = ComicsClient::new(config.client.clone())?;
    let cache = ComicsCache::new(client);
    let response = cache.retrieve().await?;

    match config.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*response)?),
        OutputFormat::Summary => print_summary(&response),
    }

    Ok(())
}

//! Command-line interface parsing for comicshelf
//!
//! This module handles parsing of CLI arguments using clap. Keys and the API
//! root fall back to environment variables so secrets stay out of shell
//! history.

use clap::Parser;

use crate::data::client::{BASE_URL_ENV, MARVEL_API_BASE_URL, PRIVATE_KEY_ENV, PUBLIC_KEY_ENV};
use crate::data::{ClientConfig, Credentials};

/// comicshelf - list the latest Marvel comics
#[derive(Parser, Debug)]
#[command(name = "comicshelf")]
#[command(about = "List the latest comics from the Marvel catalog API")]
#[command(version)]
pub struct Cli {
    /// Marvel public API key
    #[arg(long, env = PUBLIC_KEY_ENV, default_value = "", hide_env_values = true)]
    pub public_key: String,

    /// Marvel private API key
    #[arg(long, env = PRIVATE_KEY_ENV, default_value = "", hide_env_values = true)]
    pub private_key: String,

    /// API root the `/comics` path is appended to
    #[arg(long, env = BASE_URL_ENV, default_value = MARVEL_API_BASE_URL)]
    pub base_url: String,

    /// Print the raw response as pretty JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per comic
    #[default]
    Summary,
    /// The response as pretty-printed JSON
    Json,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Settings for the API client
    pub client: ClientConfig,
    /// Output format
    pub output: OutputFormat,
    /// Default log filter when RUST_LOG is unset
    pub log_level: &'static str,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Empty keys are accepted; the service rejects the request instead.
    pub fn from_cli(cli: &Cli) -> Self {
        let credentials = Credentials::new(cli.public_key.clone(), cli.private_key.clone());

        StartupConfig {
            client: ClientConfig::new(credentials).with_base_url(cli.base_url.clone()),
            output: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Summary
            },
            log_level: if cli.verbose { "debug" } else { "info" },
        }
    }
}

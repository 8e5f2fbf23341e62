//! FNA Classifier CLI
//!
//! A command-line tool for checking the inference service and classifying
//! fine-needle aspirate samples from their 30 diagnostic features.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::predict::{self, FieldEdit, InputSource};
use commands::{features, service};
use predict_lib::{ApiClient, ApiClientBuilder};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// FNA Classifier CLI
#[derive(Parser)]
#[command(name = "fnac")]
#[command(author, version, about = "CLI for the FNA Tumour Classifier", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via FNAC_API_URL env var)
    #[arg(long, env = "FNAC_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, env = "FNAC_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Path to the config file (defaults to ~/.config/fnac/config.json)
    #[arg(long, env = "FNAC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show service metadata
    Info,

    /// Show service health and whether a model is loaded
    Health,

    /// Show the active model and its promotion metadata
    Model,

    /// List the 30 features with the reference example values
    Features,

    /// Classify one sample
    Predict {
        /// Use the reference example sample
        #[arg(long, conflicts_with_all = ["values", "file"])]
        example: bool,

        /// 30 values separated by commas and/or whitespace
        #[arg(long, conflicts_with = "file")]
        values: Option<String>,

        /// Read the 30 values from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Override one feature, 1-based (e.g. --set 3=122.8); repeatable
        #[arg(long = "set", value_name = "N=VALUE", value_parser = predict::parse_field_edit)]
        edits: Vec<FieldEdit>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays clean
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::Config::load(cli.config.as_deref())?.resolve(
        cli.api_url,
        cli.timeout_ms,
        cli.format,
    )?;
    debug!(
        api_url = %settings.api_url,
        timeout_ms = settings.timeout.as_millis() as u64,
        format = ?settings.format,
        "Resolved settings"
    );

    let build_client = || -> Result<ApiClient> {
        ApiClientBuilder::new()
            .base_url(settings.api_url.clone())
            .timeout(settings.timeout)
            .build()
            .context("Failed to create API client")
    };

    match cli.command {
        Commands::Info => service::show_info(&build_client()?, settings.format).await?,
        Commands::Health => service::show_health(&build_client()?, settings.format).await?,
        Commands::Model => service::show_model(&build_client()?, settings.format).await?,
        Commands::Features => features::list_features(settings.format)?,
        Commands::Predict {
            example,
            values,
            file,
            edits,
        } => {
            let source = match (example, values, file) {
                (true, _, _) => InputSource::Example,
                (false, Some(values), _) => InputSource::Values(values),
                (false, None, Some(path)) => InputSource::File(path),
                (false, None, None) => InputSource::Empty,
            };
            predict::run_prediction(build_client()?, source, edits, settings.format).await?;
        }
    }

    Ok(())
}

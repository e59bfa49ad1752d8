//! MCP Server Binary Entry Point
//!
//! Serves the Reader `list_documents` tool over stdin/stdout following the
//! Model Context Protocol. Requires READER_ACCESS_TOKEN or ACCESS_TOKEN,
//! either in the environment or in a `.env` file.

use anyhow::Context;
use clap::Parser;
use reader_common::telemetry;
use reader_common::{ReaderError, EXIT_CONFIG_ERROR, EXIT_ERROR, EXIT_SUCCESS};
use reader_config::{Config, OutputFormat};
use reader_core::{ReaderApi, ReaderClient};
use reader_mcp::{server, McpServer};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::runtime::Runtime;

#[derive(Parser)]
#[command(
    name = "reader_mcp",
    version,
    about = "MCP server exposing the Readwise Reader document list"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Tool output format: json or text
    #[arg(long)]
    output: Option<String>,

    /// Check the access token against the auth endpoint before serving
    #[arg(long)]
    verify_token: bool,
}

fn main() {
    let cli = Cli::parse();

    // Fills in only the variables the real environment leaves unset
    let dotenv = dotenvy::dotenv();

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    };

    let code = rt.block_on(run(cli, dotenv));
    std::process::exit(code);
}

async fn run(cli: Cli, dotenv: Result<PathBuf, dotenvy::Error>) -> i32 {
    let loaded = Config::load(cli.config.as_deref());

    // Initialize tracing to stderr only (stdout reserved for JSON-RPC)
    let (verbose, json_logs) = match &loaded {
        Ok(config) => (cli.verbose || config.log.verbose, cli.json_logs || config.log.json),
        Err(_) => (cli.verbose, cli.json_logs),
    };
    telemetry::init_tracing(verbose, json_logs);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring .env: {}", e),
    }

    let config = match loaded.and_then(|config| apply_cli(config, &cli)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    tracing::info!("Reader MCP server starting...");

    match serve_stdio(&config).await {
        Ok(()) => {
            tracing::info!("Reader MCP server shutting down");
            EXIT_SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            match e.downcast_ref::<ReaderError>() {
                Some(ReaderError::ConfigError(_)) | Some(ReaderError::MissingToken { .. }) => {
                    EXIT_CONFIG_ERROR
                }
                _ => EXIT_ERROR,
            }
        }
    }
}

fn apply_cli(mut config: Config, cli: &Cli) -> reader_common::Result<Config> {
    if let Some(output) = &cli.output {
        config.mcp.output = output.parse::<OutputFormat>()?;
    }
    if cli.verify_token {
        config.api.verify_token = true;
    }
    Ok(config)
}

/// Open the Reader client, serve until stdin closes, then release the client
async fn serve_stdio(config: &Config) -> anyhow::Result<()> {
    let client = ReaderClient::new(config)?;

    if config.api.verify_token {
        client
            .verify_token()
            .await
            .context("Access token verification failed")?;
    }

    let server = Arc::new(McpServer::new(Arc::new(client), &config.mcp));
    tracing::info!(output = ?server.output(), "Serving MCP over stdio");

    server::serve(
        server,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    Ok(())
}

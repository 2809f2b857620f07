//! formrelay — relay browser form submissions to a chat webhook.
//!
//! Entry point and error handling boundary. Configuration problems are
//! fatal: the process logs them and exits before binding a socket.

mod cli;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::Cli;
use formrelay::config::RelayConfig;
use formrelay::env::Env;
use formrelay::relay::{Forwarder, WebhookForwarder};
use formrelay::server;

#[tokio::main]
async fn main() {
    // Real environment variables win over `.env`.
    let dotenv = dotenvy::dotenv();
    init_logging();
    if let Err(err) = dotenv {
        if !err.not_found() {
            tracing::warn!(error = %err, "ignoring unreadable .env file");
        }
    }

    if let Err(err) = run().await {
        tracing::error!("{err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = RelayConfig::load(cli.overrides(), &Env::real())
        .context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let forwarder: Arc<dyn Forwarder> = Arc::new(
        WebhookForwarder::new(config.webhook_url.clone())
            .context("failed to build HTTP client")?,
    );

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    server::serve(listener, forwarder)
        .await
        .context("server error")
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//! Tally scoring service entry point.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tally_server::{Server, ServerConfig};
use tally_store::{MemoryStore, RetryingStore};

/// HTTP scoring API: validates requests and dispatches business methods.
#[derive(Debug, Parser)]
#[command(name = "tally-server", version, about)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Log file path; logs to stderr when omitted.
    #[arg(short, long)]
    log: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_writer(Arc::new(file)).with_ansi(false).init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;

    let config = ServerConfig::builder()
        .http_addr(format!("0.0.0.0:{}", args.port))
        .build();
    let store = Arc::new(RetryingStore::new(MemoryStore::new()));
    let server = Server::new(config, store);

    tracing::info!(port = args.port, "starting server");
    tokio::select! {
        result = server.run() => result.context("server terminated")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}

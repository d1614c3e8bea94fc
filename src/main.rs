//! # Feed Relay
//!
//! Serves Atom/RSS feeds for sites that only publish HTML listings.
//!
//! ## Usage
//!
//! ```sh
//! feed_relay 8080 --seeds ./seeds.json
//! curl http://localhost:8080/rss/daily.xml
//! ```
//!
//! ## Architecture
//!
//! Each request runs the same pipeline:
//! 1. **Lookup**: find the named source in the seed-file registry
//! 2. **Listing**: fetch the source's list page and take the top rows
//! 3. **Extraction**: fetch every row's article concurrently, sanitize bodies
//! 4. **Output**: assemble items in listing order and write Atom or RSS

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod error;
mod extractor;
mod fetcher;
mod models;
mod outputs;
mod sanitizer;
mod scrapers;
mod server;
mod utils;

use cli::Cli;
use config::SourceRegistry;
use fetcher::DocumentFetcher;
use server::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("feed_relay starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // A bad seed file is fatal: nothing is served.
    let sources = match SourceRegistry::load(&args.seeds) {
        Ok(sources) => sources,
        Err(e) => {
            error!(path = %args.seeds, error = %e, "Failed to load sources");
            return Err(e.into());
        }
    };
    info!(count = sources.len(), "Sources loaded");

    let state = AppState {
        sources: Arc::new(sources),
        fetcher: DocumentFetcher::new(&args.user_agent)?,
        options: args.aggregate_options(),
    };

    let listen_addr = args.listen_addr();
    info!(%listen_addr, "Binding");
    let listener = TcpListener::bind(&listen_addr).await?;
    server::serve(listener, state).await?;

    Ok(())
}

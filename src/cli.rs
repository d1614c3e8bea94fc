//! Command-line interface definitions.
//!
//! All options except the port can also come from environment variables.

use clap::Parser;
use std::time::Duration;

use crate::aggregator::{AggregateOptions, DEFAULT_MAX_ITEMS, DEFAULT_STAGGER_MS};
use crate::fetcher::DEFAULT_USER_AGENT;

/// Republish scraped article listings as Atom/RSS feeds.
///
/// # Examples
///
/// ```sh
/// # Serve ./seeds.json on port 8080
/// feed_relay 8080
///
/// # Different seed file, no launch stagger
/// feed_relay 8080 --seeds /etc/feed_relay/seeds.json --stagger-ms 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Port to listen on
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    /// JSON seed file listing the sources to serve
    #[arg(short, long, env = "SEEDS_PATH", default_value = "./seeds.json")]
    pub seeds: String,

    /// Number of listing rows turned into feed items
    #[arg(long, env = "MAX_ITEMS", default_value_t = DEFAULT_MAX_ITEMS)]
    pub max_items: usize,

    /// Pause between launching article fetches, in milliseconds
    #[arg(long, env = "STAGGER_MS", default_value_t = DEFAULT_STAGGER_MS)]
    pub stagger_ms: u64,

    /// User-Agent sent to origin servers
    #[arg(long, env = "FEED_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Cli {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            max_items: self.max_items,
            stagger: Duration::from_millis(self.stagger_ms),
        }
    }
}

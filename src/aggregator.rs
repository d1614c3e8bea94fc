//! Feed aggregation: list page → concurrent article extraction → feed.
//!
//! # Concurrency
//!
//! Each of the first `max_items` rows gets its own tokio task. Launches are
//! staggered by `stagger` so the origin sees a trickle rather than a burst;
//! the delay only holds back the next launch, never a running task.
//!
//! Join handles sit in a vector indexed by listing position and are joined
//! together, so item order follows the page no matter which article comes
//! back first. Each task owns its own result, so nothing is shared or locked.
//!
//! # Failures
//!
//! Only a failed list-page fetch fails the feed. A row that cannot be
//! extracted, or whose task panics, is logged and left out; the remaining
//! items keep their relative order.

use chrono::Utc;
use futures::future::join_all;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::config::SourceConfig;
use crate::error::{AggregationError, ExtractionError};
use crate::extractor;
use crate::fetcher::DocumentFetcher;
use crate::models::{Article, Feed, ListingRow};
use crate::outputs;
use crate::scrapers::ScrapeProfile;

pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const DEFAULT_STAGGER_MS: u64 = 1000;
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(DEFAULT_STAGGER_MS);

/// Knobs for one aggregation.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    /// Only the first `max_items` rows are extracted.
    pub max_items: usize,
    /// Pause between launching successive workers.
    pub stagger: Duration,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            stagger: DEFAULT_STAGGER,
        }
    }
}

/// Build `config`'s feed and serialize it in the source's format.
pub async fn aggregate(
    fetcher: &DocumentFetcher,
    config: &SourceConfig,
    profile: &'static ScrapeProfile,
    self_url: &str,
    options: AggregateOptions,
) -> Result<Vec<u8>, AggregationError> {
    let feed = build_feed(fetcher, config, profile, self_url, options).await?;
    Ok(outputs::render(&feed, config.format)?)
}

/// Fetch the listing, extract the top rows concurrently, assemble the feed.
#[instrument(level = "info", skip_all, fields(name = %config.name, url = %config.list_url))]
pub async fn build_feed(
    fetcher: &DocumentFetcher,
    config: &SourceConfig,
    profile: &'static ScrapeProfile,
    self_url: &str,
    options: AggregateOptions,
) -> Result<Feed, AggregationError> {
    info!("Fetching listing page");
    let listing = fetcher.fetch(config.list_url.as_str()).await?;
    let created_at = Utc::now();

    let rows = {
        let html = listing.parse();
        read_rows(&html, config, profile, options.max_items)
    };
    info!(rows = rows.len(), "Selected listing rows");

    let mut handles = Vec::with_capacity(rows.len());
    for row in rows {
        if row.index > 0 && !options.stagger.is_zero() {
            sleep(options.stagger).await;
        }
        let fetcher = fetcher.clone();
        let author = config.name.clone();
        handles.push(tokio::spawn(async move {
            extractor::extract(&fetcher, profile, row, &author).await
        }));
    }

    let slots = join_all(handles).await;
    let launched = slots.len();
    let items = collect_items(slots.into_iter().map(|joined| match joined {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Extraction task panicked or was cancelled");
            Err(ExtractionError::TaskFailed(e.to_string()))
        }
    }));
    info!(launched, items = items.len(), "Feed assembled");

    Ok(Feed {
        title: config.name.clone(),
        self_link: self_url.to_string(),
        created_at,
        items,
    })
}

fn read_rows(
    html: &scraper::Html,
    config: &SourceConfig,
    profile: &ScrapeProfile,
    max_items: usize,
) -> Vec<ListingRow> {
    html.select(&profile.rows)
        .take(max_items)
        .enumerate()
        .map(|(i, el)| ListingRow::from_element(i, el, profile, &config.list_url))
        .collect()
}

/// Keep successful extractions in slot order, logging and dropping the rest.
fn collect_items(
    slots: impl IntoIterator<Item = Result<Article, ExtractionError>>,
) -> Vec<Article> {
    slots
        .into_iter()
        .enumerate()
        .filter_map(|(index, slot)| match slot {
            Ok(article) => Some(article),
            Err(e) => {
                warn!(index, error = %e, "Skipping row");
                None
            }
        })
        .collect()
}

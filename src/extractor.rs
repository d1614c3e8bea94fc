//! Turning a listing row into a full [`Article`].
//!
//! For each row:
//!
//! 1. Bail out with [`ExtractionError::NoLink`] if the title has no link.
//! 2. Fetch the article page.
//! 3. Find a `YYYY-MM-DD HH:MM` stamp in the header subtitle. A missing or
//!    unparseable stamp leaves the publish time unset; it is not an error.
//! 4. Serialize the content region and run it through [`sanitize`].
//!
//! Every failure here is soft: the aggregator logs it and drops the row.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::error::ExtractionError;
use crate::fetcher::{Document, DocumentFetcher};
use crate::models::{Article, ListingRow};
use crate::sanitizer::sanitize;
use crate::scrapers::ScrapeProfile;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}[ \t\r\n\x0C][0-9]{2}:[0-9]{2}")
        .expect("valid timestamp regex")
});

/// Fetch and extract the article behind `row`.
#[instrument(level = "info", skip(fetcher, profile, row), fields(index = row.index, title = %row.title))]
pub async fn extract(
    fetcher: &DocumentFetcher,
    profile: &ScrapeProfile,
    row: ListingRow,
    author: &str,
) -> Result<Article, ExtractionError> {
    let Some(href) = row.href else {
        return Err(ExtractionError::NoLink { title: row.title });
    };
    info!(title = %row.title, url = %href, "Fetching article");

    let doc = fetcher
        .fetch(&href)
        .await
        .map_err(|source| ExtractionError::FetchFailed {
            href: href.clone(),
            source,
        })?;

    build_article(&doc, profile, row.title, href, author)
}

/// Pull timestamp and body out of a fetched article page.
pub fn build_article(
    doc: &Document,
    profile: &ScrapeProfile,
    title: String,
    href: String,
    author: &str,
) -> Result<Article, ExtractionError> {
    let html = doc.parse();

    let header_text: String = html
        .select(&profile.timestamp)
        .flat_map(|el| el.text())
        .collect();
    let published_at = parse_published(&header_text);

    let content = html
        .select(&profile.content)
        .next()
        .ok_or_else(|| ExtractionError::MissingContent { href: href.clone() })?;
    let body_html = sanitize(&content.inner_html());
    debug!(url = %doc.url, bytes = body_html.len(), ?published_at, "Extracted article body");

    Ok(Article {
        title,
        url: href.clone(),
        author: author.to_string(),
        id: href,
        published_at,
        body_html,
    })
}

/// Find and parse the first `YYYY-MM-DD HH:MM` in `text`, read as UTC.
pub fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    let stamp = TIMESTAMP.find(text)?.as_str();
    // the pattern allows any whitespace between date and time
    let normalized: String = stamp
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    NaiveDateTime::parse_from_str(&normalized, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

//! Request-scoped data flowing through the pipeline.
//!
//! - [`ListingRow`]: one summary row lifted off the list page
//! - [`Article`]: a fully extracted article, ready to become a feed item
//! - [`Feed`]: the ordered set of articles plus feed-level metadata
//!
//! None of these outlive the HTTP request that created them.

use chrono::{DateTime, Utc};
use scraper::ElementRef;
use url::Url;

use crate::scrapers::ScrapeProfile;
use crate::utils::collect_text;

/// One article summary from the listing page.
///
/// `scraper::Html` cannot cross an `.await`, so the row is read out of the
/// list document up front and carried as owned data into its worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Position on the listing page, starting at 0.
    pub index: usize,
    /// Trimmed text of the title element.
    pub title: String,
    /// Absolute article URL, or `None` when the title has no link.
    pub href: Option<String>,
}

impl ListingRow {
    /// Read title and link out of a row element.
    ///
    /// Relative links are resolved against `base`; a link that cannot be
    /// resolved is kept verbatim and left for the fetcher to reject.
    pub fn from_element(
        index: usize,
        row: ElementRef<'_>,
        profile: &ScrapeProfile,
        base: &Url,
    ) -> Self {
        let title = row
            .select(&profile.title)
            .next()
            .map(|el| collect_text(el.text()))
            .unwrap_or_default();

        let href = row
            .select(&profile.link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| match base.join(href) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => href.to_string(),
            });

        Self { index, title, href }
    }
}

/// A normalized article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub author: String,
    /// Always equal to `url`.
    pub id: String,
    /// `None` when the page carried no parseable timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Sanitized HTML fragment of the article body.
    pub body_html: String,
}

/// A feed ready for serialization. `items` is in listing order.
#[derive(Debug, Clone)]
pub struct Feed {
    pub title: String,
    pub self_link: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::jtks;
    use scraper::{Html, Selector};

    const LIST: &str = r#"
        <table><tbody>
            <tr><td><span class="item_title"><a href="/t/1">  First post </a></span></td></tr>
            <tr><td><span class="item_title">No link here</span></td></tr>
            <tr><td><span class="item_title"><a href="https://other.example/t/3">Third</a></span></td></tr>
        </tbody></table>
    "#;

    fn rows() -> Vec<ListingRow> {
        let doc = Html::parse_document(LIST);
        let tr = Selector::parse("tr").unwrap();
        let base = Url::parse("https://list.example/recent").unwrap();
        doc.select(&tr)
            .enumerate()
            .map(|(i, el)| ListingRow::from_element(i, el, &jtks::PROFILE, &base))
            .collect()
    }

    #[test]
    fn test_row_resolves_relative_link() {
        let rows = rows();
        assert_eq!(rows[0].title, "First post");
        assert_eq!(rows[0].href.as_deref(), Some("https://list.example/t/1"));
    }

    #[test]
    fn test_row_without_link() {
        let rows = rows();
        assert_eq!(rows[1].index, 1);
        assert_eq!(rows[1].title, "No link here");
        assert_eq!(rows[1].href, None);
    }

    #[test]
    fn test_row_keeps_absolute_link() {
        let rows = rows();
        assert_eq!(rows[2].href.as_deref(), Some("https://other.example/t/3"));
    }
}

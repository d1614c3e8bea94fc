//! Per-site scrape profiles.
//!
//! A profile is the set of CSS selectors that locate the pieces of a listing
//! page and an article page for one source kind. Every profile follows the
//! same two-phase shape:
//!
//! 1. **Listing**: `rows` selects article summaries; within a row, `title`
//!    and `link` give the headline text and the article URL.
//! 2. **Article**: `timestamp` selects the region holding the publish time,
//!    and `content` selects the body that becomes the feed item's HTML.
//!
//! # Supported Sources
//!
//! | Kind | Module | Default format |
//! |------|--------|----------------|
//! | `jtks` | [`jtks`] | Atom |

use scraper::Selector;

pub mod jtks;

/// Selectors for one source kind.
#[derive(Debug)]
pub struct ScrapeProfile {
    pub rows: Selector,
    pub title: Selector,
    pub link: Selector,
    pub timestamp: Selector,
    pub content: Selector,
}

impl ScrapeProfile {
    /// Build a profile from selector strings.
    ///
    /// Profiles are compiled from constants, so a bad selector is a
    /// programming error and panics at first use.
    pub fn compile(
        rows: &str,
        title: &str,
        link: &str,
        timestamp: &str,
        content: &str,
    ) -> Self {
        let parse = |s: &str| {
            Selector::parse(s).unwrap_or_else(|e| panic!("invalid selector {s:?}: {e}"))
        };
        Self {
            rows: parse(rows),
            title: parse(title),
            link: parse(link),
            timestamp: parse(timestamp),
            content: parse(content),
        }
    }
}

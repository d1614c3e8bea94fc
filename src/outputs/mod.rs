//! Feed serialization.
//!
//! A [`Feed`] is written to bytes in one of two wire formats:
//!
//! - [`atom`]: Atom 1.0 (`application/atom+xml`)
//! - [`rss`]: RSS 2.0 (`application/rss+xml`)
//!
//! The format is fixed per source and never negotiated with the client.
//! Both writers go through `quick_xml::Writer`, which escapes text content,
//! so article HTML lands in the document as an escaped fragment.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;
use std::str::FromStr;

use crate::error::FeedError;
use crate::models::Feed;

pub mod atom;
pub mod rss;

/// Wire format of a rendered feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Atom,
    Rss,
}

impl FeedFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            FeedFormat::Atom => "application/atom+xml; charset=utf-8",
            FeedFormat::Rss => "application/rss+xml; charset=utf-8",
        }
    }
}

impl FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atom" => Ok(FeedFormat::Atom),
            "rss" => Ok(FeedFormat::Rss),
            other => Err(format!("unknown feed format {other:?}")),
        }
    }
}

/// Serialize `feed` in the given format.
pub fn render(feed: &Feed, format: FeedFormat) -> Result<Vec<u8>, FeedError> {
    match format {
        FeedFormat::Atom => atom::write_feed(feed),
        FeedFormat::Rss => rss::write_feed(feed),
    }
}

/// Write `<name>text</name>`.
pub(crate) fn write_text_element<W: Write>(
    w: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), FeedError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

//! Atom 1.0 writer.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use chrono::SecondsFormat;
use tracing::{debug, instrument};

use super::write_text_element;
use crate::error::FeedError;
use crate::models::Feed;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Write `feed` as an Atom document.
///
/// Entries without a publish time omit `<published>` and use the feed's
/// creation time for the mandatory `<updated>`.
#[instrument(level = "debug", skip_all, fields(title = %feed.title, items = feed.items.len()))]
pub fn write_feed(feed: &Feed) -> Result<Vec<u8>, FeedError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ATOM_NS));
    w.write_event(Event::Start(root))?;

    let updated = feed.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    write_text_element(&mut w, "title", &feed.title)?;
    write_text_element(&mut w, "id", &feed.self_link)?;
    write_text_element(&mut w, "updated", &updated)?;
    let mut link = BytesStart::new("link");
    link.push_attribute(("href", feed.self_link.as_str()));
    link.push_attribute(("rel", "self"));
    w.write_event(Event::Empty(link))?;

    for article in &feed.items {
        w.write_event(Event::Start(BytesStart::new("entry")))?;
        write_text_element(&mut w, "title", &article.title)?;
        write_text_element(&mut w, "id", &article.id)?;

        let mut link = BytesStart::new("link");
        link.push_attribute(("href", article.url.as_str()));
        link.push_attribute(("rel", "alternate"));
        w.write_event(Event::Empty(link))?;

        w.write_event(Event::Start(BytesStart::new("author")))?;
        write_text_element(&mut w, "name", &article.author)?;
        w.write_event(Event::End(BytesEnd::new("author")))?;

        match article.published_at {
            Some(ts) => {
                let ts = ts.to_rfc3339_opts(SecondsFormat::Secs, true);
                write_text_element(&mut w, "updated", &ts)?;
                write_text_element(&mut w, "published", &ts)?;
            }
            None => write_text_element(&mut w, "updated", &updated)?,
        }

        let mut content = BytesStart::new("content");
        content.push_attribute(("type", "html"));
        w.write_event(Event::Start(content))?;
        w.write_event(Event::Text(BytesText::new(&article.body_html)))?;
        w.write_event(Event::End(BytesEnd::new("content")))?;

        w.write_event(Event::End(BytesEnd::new("entry")))?;
    }

    w.write_event(Event::End(BytesEnd::new("feed")))?;
    let out = w.into_inner();
    debug!(bytes = out.len(), "Rendered Atom feed");
    Ok(out)
}

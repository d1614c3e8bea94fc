//! RSS 2.0 writer.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, instrument};

use super::write_text_element;
use crate::error::FeedError;
use crate::models::Feed;

/// Write `feed` as an RSS 2.0 document. Article bodies go in `<description>`.
#[instrument(level = "debug", skip_all, fields(title = %feed.title, items = feed.items.len()))]
pub fn write_feed(feed: &Feed) -> Result<Vec<u8>, FeedError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("rss");
    root.push_attribute(("version", "2.0"));
    w.write_event(Event::Start(root))?;
    w.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut w, "title", &feed.title)?;
    write_text_element(&mut w, "link", &feed.self_link)?;
    write_text_element(&mut w, "description", &feed.title)?;
    write_text_element(&mut w, "lastBuildDate", &feed.created_at.to_rfc2822())?;

    for article in &feed.items {
        w.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut w, "title", &article.title)?;
        write_text_element(&mut w, "link", &article.url)?;

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "true"));
        w.write_event(Event::Start(guid))?;
        w.write_event(Event::Text(BytesText::new(&article.id)))?;
        w.write_event(Event::End(BytesEnd::new("guid")))?;

        write_text_element(&mut w, "author", &article.author)?;
        if let Some(ts) = article.published_at {
            write_text_element(&mut w, "pubDate", &ts.to_rfc2822())?;
        }
        write_text_element(&mut w, "description", &article.body_html)?;
        w.write_event(Event::End(BytesEnd::new("item")))?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))?;
    w.write_event(Event::End(BytesEnd::new("rss")))?;
    let out = w.into_inner();
    debug!(bytes = out.len(), "Rendered RSS feed");
    Ok(out)
}

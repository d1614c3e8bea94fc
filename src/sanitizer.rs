//! HTML fragment cleanup for republished article bodies.
//!
//! Sites that lazy-load images keep the real URL in `data-src` and decorate
//! `<img>` tags with editor and cropping attributes. Outside the source
//! page none of that works, so every `<img>` in a fragment is rewritten:
//!
//! 1. A `data-src` value is promoted to `src`. If it wraps another absolute
//!    URL (a CDN signing prefix followed by the real `http(s)://` address),
//!    only the embedded URL is kept.
//! 2. Every attribute on [`DENY_LIST`] is dropped.
//!
//! Tags needing neither change are left byte-for-byte as they were, which
//! also makes [`sanitize`] idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tracking, layout and ad attributes stripped from images.
pub const DENY_LIST: &[&str] = &[
    "data-label",
    "data-backh",
    "data-backw",
    "data-before-oversubscription-url",
    "data-ratio",
    "data-src",
    "data-type",
    "data-w",
    "data-copyright",
    "data-s",
    "data-ad-layout",
    "data-ad-format",
    "data-ad-client",
    "data-ad-slot",
    "data-croporisrc",
    "data-cropx1",
    "data-cropx2",
    "data-cropy1",
    "data-cropy2",
    "data-role",
    "data-id",
    "data-width",
    "data-cropselx1",
    "data-cropselx2",
    "data-cropsely1",
    "data-cropsely2",
    "data-style-type",
    "data-url",
    "data-author-name",
    "data-content-utf8-length",
    "data-source-title",
    "data-original-title",
    "data-autoskip",
    "data-oversubscription-url",
];

const LAZY_SRC: &str = "data-src";

static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b((?:[^>"']|"[^"]*"|'[^']*')*?)\s*(/?)>"#).expect("valid img regex")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

/// One attribute as written in the source, value still entity-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Attr {
    name: String,
    value: Option<String>,
}

/// Rewrite every `<img>` tag in `fragment`.
pub fn sanitize(fragment: &str) -> String {
    IMG_TAG
        .replace_all(fragment, |caps: &regex::Captures<'_>| {
            match rewrite_img(&caps[1], &caps[2]) {
                Some(tag) => tag,
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Returns `None` when the tag needs no change.
fn rewrite_img(attr_text: &str, self_close: &str) -> Option<String> {
    let mut attrs = parse_attrs(attr_text);
    let lazy_src = attrs
        .iter()
        .find(|a| a.name == LAZY_SRC)
        .and_then(|a| a.value.clone())
        .filter(|v| !v.is_empty());
    let has_denied = attrs.iter().any(|a| is_denied(&a.name));

    if lazy_src.is_none() && !has_denied {
        return None;
    }

    if let Some(src) = lazy_src {
        let src = strip_signing_prefix(&src).to_string();
        match attrs.iter_mut().find(|a| a.name == "src") {
            Some(existing) => existing.value = Some(src),
            None => attrs.push(Attr {
                name: "src".to_string(),
                value: Some(src),
            }),
        }
    }
    attrs.retain(|a| !is_denied(&a.name));

    let mut tag = String::from("<img");
    for attr in &attrs {
        tag.push(' ');
        tag.push_str(&attr.name);
        if let Some(value) = &attr.value {
            let quote = if value.contains('"') { '\'' } else { '"' };
            tag.push('=');
            tag.push(quote);
            tag.push_str(value);
            tag.push(quote);
        }
    }
    if !self_close.is_empty() {
        tag.push_str(" /");
    }
    tag.push('>');
    Some(tag)
}

fn parse_attrs(text: &str) -> Vec<Attr> {
    ATTRIBUTE
        .captures_iter(text)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            Attr {
                name: caps[1].to_ascii_lowercase(),
                value,
            }
        })
        .collect()
}

fn is_denied(name: &str) -> bool {
    DENY_LIST.contains(&name)
}

/// Keep only the last embedded absolute URL.
///
/// `https://cdn.example/sig?url=http://real.example/a.jpg` becomes
/// `http://real.example/a.jpg`; a plain URL is returned unchanged.
pub fn strip_signing_prefix(src: &str) -> &str {
    let start = [src.rfind("http://"), src.rfind("https://")]
        .into_iter()
        .flatten()
        .max();
    match start {
        Some(pos) => &src[pos..],
        None => src,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lazy_src_promoted_and_truncated() {
        let html = r#"<p><img data-src="https://cdn.example/sig?url=http://real.example/a.jpg" alt="x"></p>"#;
        assert_eq!(
            sanitize(html),
            r#"<p><img alt="x" src="http://real.example/a.jpg"></p>"#
        );
    }

    #[test]
    fn test_lazy_src_overwrites_placeholder_src() {
        let html = r#"<img src="data:image/gif;base64,R0l" data-src="https://img.example/b.png">"#;
        assert_eq!(sanitize(html), r#"<img src="https://img.example/b.png">"#);
    }

    #[test]
    fn test_empty_lazy_src_keeps_existing_src() {
        let html = r#"<img src="https://real.example/ok.jpg" data-src="">"#;
        assert_eq!(sanitize(html), r#"<img src="https://real.example/ok.jpg">"#);

        let html = r#"<img data-src="" data-ratio="1" alt="x">"#;
        assert_eq!(sanitize(html), r#"<img alt="x">"#);
    }

    #[test]
    fn test_image_without_lazy_src_untouched() {
        let html = r#"<div><img src="https://img.example/c.png" alt='quoted'  ></div>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_denied_attributes_removed_without_lazy_src() {
        let html = r#"<img src="https://img.example/d.png" data-ratio="0.5" data-w="640" class="rich">"#;
        assert_eq!(
            sanitize(html),
            r#"<img src="https://img.example/d.png" class="rich">"#
        );
    }

    #[test]
    fn test_every_denied_attribute_removed() {
        let attrs: String = DENY_LIST
            .iter()
            .map(|name| format!(r#" {name}="v""#))
            .collect();
        let html = format!(r#"<img{attrs}>"#);
        let out = sanitize(&html);
        assert_eq!(out, r#"<img src="v">"#);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let html = r#"<section>
            <img data-src="https://cdn.example/x?u=https://real.example/1.jpg" data-type="jpeg" data-s="300,640" style="width:100%">
            <p>text &amp; more</p>
            <IMG SRC="https://plain.example/2.jpg" DATA-COPYRIGHT="0"/>
            <img src="https://plain.example/3.jpg">
        </section>"#;
        let once = sanitize(html);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
        assert!(!once.to_lowercase().contains("data-"));
    }

    #[test]
    fn test_self_closing_preserved() {
        let html = r#"<img data-src="https://a.example/x.jpg"/>"#;
        assert_eq!(sanitize(html), r#"<img src="https://a.example/x.jpg" />"#);
    }

    #[test]
    fn test_non_image_tags_untouched() {
        let html = r#"<a data-src="https://a.example/" data-id="7">link</a>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_strip_signing_prefix() {
        assert_eq!(
            strip_signing_prefix("https://cdn.example/sig?url=http://real.example/a.jpg"),
            "http://real.example/a.jpg"
        );
        assert_eq!(
            strip_signing_prefix("https://plain.example/a.jpg"),
            "https://plain.example/a.jpg"
        );
        assert_eq!(strip_signing_prefix("//proto-relative/a.jpg"), "//proto-relative/a.jpg");
    }
}

//! Forum-style listing pages whose threads link out to article pages.
//!
//! The listing page is a table of recent threads under `#Main`; each thread
//! row carries an `.item_title` link to the article. The article page shows
//! its publish time in the header subtitle and its body in `#js_content`.

use once_cell::sync::Lazy;

use super::ScrapeProfile;

pub static PROFILE: Lazy<ScrapeProfile> = Lazy::new(|| {
    ScrapeProfile::compile(
        "#Main > .box > .entries > .item table tbody tr",
        ".item_title",
        ".item_title > a",
        "#Main > .box > .header > small",
        "#js_content",
    )
});

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_profile_selects_rows() {
        let html = r#"
            <div id="Main"><div class="box"><div class="entries">
                <div class="item"><table><tbody>
                    <tr><td><span class="item_title"><a href="/a">A</a></span></td></tr>
                </tbody></table></div>
                <div class="item"><table><tbody>
                    <tr><td><span class="item_title"><a href="/b">B</a></span></td></tr>
                </tbody></table></div>
            </div></div></div>
        "#;
        let doc = Html::parse_document(html);
        assert_eq!(doc.select(&PROFILE.rows).count(), 2);
    }
}

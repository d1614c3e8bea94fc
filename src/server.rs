//! HTTP surface: `GET /rss/{name}` and `GET /rss/{name}.xml`.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | feed built | 200, Atom or RSS body |
//! | no source with that name | 404, empty body |
//! | source kind not recognized | 400, `Unknown source: <kind>` |
//! | list page unreachable or feed unwritable | 500, error text |

use axum::{
    Router,
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::aggregator::{self, AggregateOptions};
use crate::config::SourceRegistry;
use crate::error::AppResult;
use crate::fetcher::DocumentFetcher;

/// Shared, read-only request context.
#[derive(Debug, Clone)]
pub struct AppState {
    pub sources: Arc<SourceRegistry>,
    pub fetcher: DocumentFetcher,
    pub options: AggregateOptions,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rss/{name}", get(serve_feed))
        .with_state(state)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr()?, sources = state.sources.len(), "Listening");
    axum::serve(listener, create_router(state)).await
}

#[instrument(level = "info", skip_all, fields(name = %name))]
async fn serve_feed(
    State(state): State<AppState>,
    Path(name): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> AppResult<Response> {
    let name = name.strip_suffix(".xml").unwrap_or(&name);
    let config = state.sources.get(name)?;
    let profile = config.kind.profile()?;
    info!(name = %config.name, url = %config.list_url, "Fetching feed");

    let self_url = self_url(&headers, &uri);
    let body = aggregator::aggregate(&state.fetcher, config, profile, &self_url, state.options).await?;
    info!(bytes = body.len(), "Done");

    Ok(([(header::CONTENT_TYPE, config.format.content_type())], body).into_response())
}

/// Absolute URL of the current request, used as the feed's id and self link.
fn self_url(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("http://{host}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::DEFAULT_USER_AGENT;
    use std::net::SocketAddr;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = r#"<html><body><div id="Main"><div class="box"><div class="entries">
        <div class="item"><table><tbody><tr>
            <td><span class="item_title"><a href="/t/1">Only post</a></span></td>
        </tr></tbody></table></div>
    </div></div></div></body></html>"#;

    const ARTICLE: &str = r#"<html><body><div id="Main"><div class="box">
        <div class="header"><small>2023-04-05 09:30</small></div>
        <div id="js_content"><p>hello</p></div>
    </div></div></body></html>"#;

    async fn spawn_app(seeds: &str) -> SocketAddr {
        let state = AppState {
            sources: Arc::new(SourceRegistry::from_json(seeds).unwrap()),
            fetcher: DocumentFetcher::new(DEFAULT_USER_AGENT).unwrap(),
            options: AggregateOptions {
                stagger: Duration::ZERO,
                ..AggregateOptions::default()
            },
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));
        addr
    }

    fn seeds(list_url: &str) -> String {
        format!(
            r#"[
                {{"Name": "daily", "Url": "{list_url}", "Source": "jtks"}},
                {{"Name": "weekly", "Url": "{list_url}", "Source": "jtks", "Format": "rss"}},
                {{"Name": "odd", "Url": "{list_url}", "Source": "mystery"}}
            ]"#
        )
    }

    async fn mount_origin(mock_server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/t/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_serves_atom_feed() {
        let mock_server = MockServer::start().await;
        mount_origin(&mock_server).await;
        let addr = spawn_app(&seeds(&format!("{}/list", mock_server.uri()))).await;

        let resp = reqwest::get(format!("http://{addr}/rss/daily.xml")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/atom+xml; charset=utf-8"
        );
        let body = resp.text().await.unwrap();
        assert!(body.contains("<title>Only post</title>"));
        assert!(body.contains(&format!("<id>http://{addr}/rss/daily.xml</id>")));
        assert!(body.contains("&lt;p&gt;hello&lt;/p&gt;"));
    }

    #[tokio::test]
    async fn test_serves_rss_feed_without_suffix() {
        let mock_server = MockServer::start().await;
        mount_origin(&mock_server).await;
        let addr = spawn_app(&seeds(&format!("{}/list", mock_server.uri()))).await;

        let resp = reqwest::get(format!("http://{addr}/rss/weekly")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/rss+xml; charset=utf-8"
        );
        assert!(resp.text().await.unwrap().contains("<item>"));
    }

    #[tokio::test]
    async fn test_unknown_name_is_404() {
        let addr = spawn_app(&seeds("http://127.0.0.1:1/list")).await;

        let resp = reqwest::get(format!("http://{addr}/rss/nope.xml")).await.unwrap();
        assert_eq!(resp.status(), 404);
        assert!(resp.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_name_is_404() {
        let addr = spawn_app(&seeds("http://127.0.0.1:1/list")).await;

        let resp = reqwest::get(format!("http://{addr}/rss/")).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_400() {
        let addr = spawn_app(&seeds("http://127.0.0.1:1/list")).await;

        let resp = reqwest::get(format!("http://{addr}/rss/odd")).await.unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(resp.text().await.unwrap(), "Unknown source: mystery");
    }

    #[tokio::test]
    async fn test_list_page_503_is_500() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&mock_server)
            .await;
        let addr = spawn_app(&seeds(&format!("{}/list", mock_server.uri()))).await;

        let resp = reqwest::get(format!("http://{addr}/rss/daily")).await.unwrap();
        assert_eq!(resp.status(), 500);
        assert!(resp.text().await.unwrap().contains("503"));
    }

    #[test]
    fn test_self_url_uses_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "feeds.example:8080".parse().unwrap());
        let uri: Uri = "/rss/daily.xml?x=1".parse().unwrap();
        assert_eq!(
            self_url(&headers, &uri),
            "http://feeds.example:8080/rss/daily.xml?x=1"
        );
    }
}

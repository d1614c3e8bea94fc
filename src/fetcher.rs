//! Document fetching.
//!
//! [`DocumentFetcher`] issues a single GET with a browser-like User-Agent
//! (some origins reject default agents), insists on `200 OK`, and hands back
//! the body as a [`Document`]. There are no retries and no timeout beyond
//! the client's defaults; callers decide what a failure means.

use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::utils::truncate_for_log;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36";

/// How much of a non-200 body is kept in the error.
const BODY_SNIPPET_LEN: usize = 512;

/// A fetched HTML page.
///
/// `scraper::Html` is neither `Send` nor `Sync`, so the page is kept as text
/// and parsed on demand inside synchronous code.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub body: String,
}

impl Document {
    /// Parse the body into a selector-queryable tree.
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// HTTP GET + status check, cheap to clone into workers.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    /// Build a fetcher whose client sends `user_agent` on every request.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Fetch `url` and return its body.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Non-200 response");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body_snippet: truncate_for_log(&body, BODY_SNIPPET_LEN),
            });
        }

        let body = resp.text().await.map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(bytes = body.len(), "Fetched document");

        Ok(Document {
            url: url.to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "feed-relay-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p class=\"x\">hello</p>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = DocumentFetcher::new("feed-relay-test/1.0").unwrap();
        let doc = fetcher
            .fetch(&format!("{}/page", mock_server.uri()))
            .await
            .unwrap();

        let html = doc.parse();
        let sel = Selector::parse(".x").unwrap();
        let text: String = html.select(&sel).next().unwrap().text().collect();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .mount(&mock_server)
            .await;

        let fetcher = DocumentFetcher::new(DEFAULT_USER_AGENT).unwrap();
        let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();
        match err {
            FetchError::Status {
                status,
                body_snippet,
                ..
            } => {
                assert_eq!(status, 503);
                assert_eq!(body_snippet, "try later");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_no_content_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let fetcher = DocumentFetcher::new(DEFAULT_USER_AGENT).unwrap();
        let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        let fetcher = DocumentFetcher::new(DEFAULT_USER_AGENT).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/nothing").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}

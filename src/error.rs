//! Error taxonomy for the scrape-and-aggregate pipeline.
//!
//! Each stage owns an error type:
//!
//! | Error | Raised by | Surfaces as |
//! |-------|-----------|-------------|
//! | [`FetchError`] | [`crate::fetcher`] | 500 for the list page, logged-and-skipped per row |
//! | [`ExtractionError`] | [`crate::extractor`] | always soft, the row is omitted |
//! | [`ConfigLookupError`] | [`crate::config`] | 404 / 400 |
//! | [`FeedError`] | [`crate::outputs`] | 500 |
//! | [`AggregationError`] | [`crate::aggregator`] | 500 |
//!
//! [`AppError`] is the router-facing wrapper that turns any of them into an
//! HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure to obtain a document from an origin server.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection refused, TLS, timeout.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Anything other than `200 OK`.
    #[error("status code error: {status} from {url}\nBody:\n{body_snippet}")]
    Status {
        url: String,
        status: u16,
        body_snippet: String,
    },
    /// The body could not be read or decoded as text.
    #[error("malformed body from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Failure to turn one listing row into an article. Never fatal to a feed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot find URL for title {title:?}")]
    NoLink { title: String },

    #[error("failed to get document for {href}: {source}")]
    FetchFailed {
        href: String,
        #[source]
        source: FetchError,
    },

    #[error("no content region in {href}")]
    MissingContent { href: String },

    #[error("extraction task failed: {0}")]
    TaskFailed(String),
}

/// Client-facing lookup failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigLookupError {
    #[error("no source named {0:?}")]
    UnknownSource(String),

    #[error("Unknown source: {0}")]
    UnknownKind(String),
}

/// Feed-to-wire conversion failure.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to write feed: {0}")]
    Io(#[from] std::io::Error),
}

/// Feed-fatal failures of a single aggregation.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error(transparent)]
    ListFetchFailed(#[from] FetchError),

    #[error(transparent)]
    Serialization(#[from] FeedError),
}

/// Everything a request handler can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lookup(#[from] ConfigLookupError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Lookup(ConfigLookupError::UnknownSource(name)) => {
                tracing::info!(%name, "Request for unknown source");
                StatusCode::NOT_FOUND.into_response()
            }
            AppError::Lookup(e @ ConfigLookupError::UnknownKind(_)) => {
                tracing::warn!(error = %e, "Source has an unrecognized kind");
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            AppError::Aggregation(AggregationError::Serialization(e)) => {
                tracing::error!(error = %e, "Feed serialization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            AppError::Aggregation(e) => {
                tracing::error!(error = %e, "Aggregation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

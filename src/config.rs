//! Source configuration loaded once at startup.
//!
//! The seed file is a JSON array of objects:
//!
//! ```json
//! [
//!   { "Name": "daily", "Url": "https://forum.example/go/daily", "Source": "jtks" },
//!   { "Name": "weekly", "Url": "https://forum.example/go/weekly", "Source": "jtks", "Format": "rss" }
//! ]
//! ```
//!
//! Parsing produces a [`SourceRegistry`], an immutable name-keyed map that is
//! shared by reference with the request layer and never mutated afterwards.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::error::ConfigLookupError;
use crate::outputs::FeedFormat;
use crate::scrapers::{jtks, ScrapeProfile};

/// Startup failures. Any of these stops the process before it serves.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("source {name:?} has an invalid URL {url:?}: {source}")]
    InvalidUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("source {name:?} has an unknown format {format:?}")]
    InvalidFormat { name: String, format: String },

    #[error("source name {0:?} is configured more than once")]
    DuplicateName(String),
}

/// The kind of site a source scrapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Jtks,
    /// Loaded without complaint; rejected when a request hits it.
    Unknown(String),
}

impl From<&str> for SourceKind {
    fn from(s: &str) -> Self {
        match s {
            "jtks" => SourceKind::Jtks,
            other => SourceKind::Unknown(other.to_string()),
        }
    }
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::Jtks => "jtks",
            SourceKind::Unknown(s) => s,
        }
    }

    /// Selectors used to scrape this kind of site.
    pub fn profile(&self) -> Result<&'static ScrapeProfile, ConfigLookupError> {
        match self {
            SourceKind::Jtks => Ok(&*jtks::PROFILE),
            SourceKind::Unknown(s) => Err(ConfigLookupError::UnknownKind(s.clone())),
        }
    }

    fn default_format(&self) -> FeedFormat {
        FeedFormat::Atom
    }
}

/// One configured source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub list_url: Url,
    pub kind: SourceKind,
    pub format: FeedFormat,
}

/// Seed file entry as written on disk.
#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Url")]
    url: String,
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Format", default)]
    format: Option<String>,
}

impl TryFrom<RawSource> for SourceConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSource) -> Result<Self, Self::Error> {
        let list_url = Url::parse(&raw.url).map_err(|source| ConfigError::InvalidUrl {
            name: raw.name.clone(),
            url: raw.url.clone(),
            source,
        })?;
        let kind = SourceKind::from(raw.source.as_str());
        let format = match raw.format.as_deref() {
            None => kind.default_format(),
            Some(f) => f.parse::<FeedFormat>().map_err(|_| ConfigError::InvalidFormat {
                name: raw.name.clone(),
                format: f.to_string(),
            })?,
        };
        Ok(Self {
            name: raw.name,
            list_url,
            kind,
            format,
        })
    }
}

/// Immutable name → source lookup.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, SourceConfig>,
}

impl SourceRegistry {
    /// Parse a seed file's JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: Vec<RawSource> = serde_json::from_str(json)?;
        let mut sources = HashMap::with_capacity(raw.len());
        for (idx, entry) in raw.into_iter().enumerate() {
            let config = SourceConfig::try_from(entry)?;
            info!(
                idx,
                name = %config.name,
                url = %config.list_url,
                source = config.kind.as_str(),
                format = ?config.format,
                "Loaded source"
            );
            if sources.contains_key(&config.name) {
                return Err(ConfigError::DuplicateName(config.name));
            }
            sources.insert(config.name.clone(), config);
        }
        Ok(Self { sources })
    }

    /// Read and parse the seed file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Result<&SourceConfig, ConfigLookupError> {
        self.sources
            .get(name)
            .ok_or_else(|| ConfigLookupError::UnknownSource(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }
}

//! Remote broadcast catalog: `category -> event -> stream`

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::{PipelineError, Result};

pub const DEFAULT_CATEGORY_NAME: &str = "General";
pub const DEFAULT_EVENT_NAME: &str = "Unknown";
pub const DEFAULT_EVENT_ID: &str = "0";
pub const DEFAULT_STREAM_NAME: &str = "Stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub id: String,
    pub logo: String,
    pub streams: Vec<Stream>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub name: String,
    pub url: String,
}

impl Stream {
    /// Only web embeds can go through the handshake
    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.url.starts_with("http")
    }
}

pub type Catalog = Vec<Category>;

#[derive(Debug, Deserialize)]
struct RawCategory {
    category: Option<String>,
    events: Option<Vec<RawEvent>>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    name: Option<String>,
    #[serde(rename = "URL")]
    id: Option<RawId>,
    logo: Option<String>,
    streams: Option<Vec<RawStream>>,
}

/// Some feeds send the event id as a bare number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
struct RawStream {
    name: Option<String>,
    url: Option<String>,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        Self {
            name: raw
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_string()),
            events: raw
                .events
                .unwrap_or_default()
                .into_iter()
                .map(Event::from)
                .collect(),
        }
    }
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
            id: match raw.id {
                Some(RawId::Text(id)) => id,
                Some(RawId::Number(id)) => id.to_string(),
                None => DEFAULT_EVENT_ID.to_string(),
            },
            logo: raw.logo.unwrap_or_default(),
            streams: raw
                .streams
                .unwrap_or_default()
                .into_iter()
                .map(|s| Stream {
                    name: s.name.unwrap_or_else(|| DEFAULT_STREAM_NAME.to_string()),
                    url: s.url.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Validates a catalog document and fills in missing fields
///
/// # Errors
/// Errors when the document is not a JSON array of category objects
pub fn parse_catalog(body: &str) -> Result<Catalog> {
    let raw = serde_json::from_str::<Vec<RawCategory>>(body).map_err(PipelineError::CatalogParse)?;
    Ok(raw.into_iter().map(Category::from).collect())
}

/// Downloads and validates the catalog with a single GET
///
/// # Errors
/// * Network error or timeout
/// * Any status other than `200 OK`
/// * Body is not a valid catalog, see [`parse_catalog`]
#[instrument(skip(client))]
pub async fn fetch_catalog(
    client: &reqwest::Client,
    source_url: &str,
    timeout: Duration,
) -> Result<Catalog> {
    info!("Fetching source from {source_url}");
    let res = client
        .get(source_url)
        .timeout(timeout)
        .send()
        .await
        .map_err(PipelineError::CatalogFetch)?;

    if res.status() != reqwest::StatusCode::OK {
        return Err(PipelineError::CatalogStatus(res.status()));
    }

    let body = res.text().await.map_err(PipelineError::CatalogFetch)?;
    parse_catalog(&body)
}

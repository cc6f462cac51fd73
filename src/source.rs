use crate::errors::SeriesError;
use crate::models::RawRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::info;

/// Upstream collaborator that hands back already-decoded rows.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<Vec<RawRecord>, SeriesError>;
}

/// Payload shape of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// `{"features": [{"attributes": {...}}, ...]}`
    FeatureCollection,
    /// `[{...}, {...}]`
    FlatArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Http(String),
    File(PathBuf),
}

impl std::fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedLocation::Http(url) => f.write_str(url),
            FeedLocation::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

pub struct FeedSource {
    name: String,
    location: FeedLocation,
    format: FeedFormat,
    client: Client,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, location: FeedLocation, format: FeedFormat) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            name: name.into(),
            location,
            format,
            client,
        }
    }

    pub fn location(&self) -> &FeedLocation {
        &self.location
    }

    async fn fetch_json(&self) -> Result<Value, SeriesError> {
        let unavailable = |err: &dyn std::fmt::Display| SeriesError::unavailable(&self.name, err);

        match &self.location {
            FeedLocation::Http(url) => {
                let resp = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| unavailable(&e))?;
                if !resp.status().is_success() {
                    return Err(unavailable(&format!("HTTP {}", resp.status())));
                }
                resp.json().await.map_err(|e| unavailable(&e))
            }
            FeedLocation::File(path) => {
                let bytes = fs::read(path).await.map_err(|e| unavailable(&e))?;
                serde_json::from_slice(&bytes).map_err(|e| unavailable(&e))
            }
        }
    }
}

#[async_trait]
impl DataSource for FeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SeriesError> {
        info!(source = %self.name, location = %self.location, "fetching feed");
        let json = self.fetch_json().await?;
        parse_feed(&json, self.format)
            .map_err(|reason| SeriesError::unavailable(&self.name, reason))
    }
}

/// Pulls the flat per-date records out of a decoded payload. Entries that
/// are not objects are skipped.
pub fn parse_feed(json: &Value, format: FeedFormat) -> Result<Vec<RawRecord>, String> {
    match format {
        FeedFormat::FeatureCollection => {
            let features = json
                .get("features")
                .and_then(Value::as_array)
                .ok_or("payload has no `features` array")?;
            Ok(features
                .iter()
                .filter_map(|feature| feature.get("attributes")?.as_object().cloned())
                .collect())
        }
        FeedFormat::FlatArray => {
            let rows = json.as_array().ok_or("payload is not a JSON array")?;
            Ok(rows.iter().filter_map(|row| row.as_object().cloned()).collect())
        }
    }
}

//! Source retrieval and payload dispatch
//!
//! Every configured URL is fetched in its own task. A source that times out,
//! answers with a non-200 status or serves something unparseable is logged
//! and skipped; it never aborts the refresh. Parsed sightings are merged into
//! the index under construction by the single task driving [`Fetcher::fetch_all`].
//!
//! Format detection:
//! 1. JSON if the content type says `application/json` or the body starts
//!    with `{` / `[` (decode failure skips the source)
//! 2. Delimited text if the content type says `text/csv` or a comma shows up
//!    in the first 200 characters
//! 3. Otherwise one last JSON attempt; failure means "unsupported format"
//!    and the source quietly contributes nothing

use super::parsers::{parse_delimited, parse_json};
use crate::error::FetchError;
use crate::index::{AddressIndex, Sighting};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinSet;

/// Characters inspected when sniffing for delimited text
const SNIFF_CHARS: usize = 200;

/// Raw response from a source
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub status: u16,
    /// Lowercased `Content-Type` header, if any
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPayload {
    pub fn ok(content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(str::to_lowercase),
            body: body.into(),
        }
    }
}

/// Transport used to retrieve sources
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Retrieve `url`; non-200 responses are returned, not turned into errors
    async fn get(&self, url: &str) -> Result<FetchedPayload, FetchError>;
}

/// `reqwest`-backed client with a whole-request timeout
#[derive(Debug, Clone)]
pub struct HttpSourceClient {
    client: reqwest::Client,
}

impl HttpSourceClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("darkscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn get(&self, url: &str) -> Result<FetchedPayload, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_lowercase);
        let body = response.text().await?;

        Ok(FetchedPayload {
            status,
            content_type,
            body,
        })
    }
}

/// How a payload will be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Delimited,
    /// Neither declared nor sniffed; JSON is tried as a last resort
    Unknown,
}

pub fn classify(content_type: Option<&str>, body: &str) -> PayloadFormat {
    let content_type = content_type.unwrap_or_default();
    let trimmed = body.trim_start();

    if content_type.contains("application/json")
        || trimmed.starts_with('{')
        || trimmed.starts_with('[')
    {
        PayloadFormat::Json
    } else if content_type.contains("text/csv")
        || body.chars().take(SNIFF_CHARS).any(|c| c == ',')
    {
        PayloadFormat::Delimited
    } else {
        PayloadFormat::Unknown
    }
}

/// Parse one payload
///
/// Returns:
/// - `Ok(Some(..))` - a parser ran (possibly yielding nothing); the source
///   counts as used
/// - `Ok(None)` - unsupported format, skipped without complaint
/// - `Err(..)` - declared/sniffed JSON that failed to decode
pub fn parse_payload(
    payload: &FetchedPayload,
    source: &str,
) -> Result<Option<Vec<Sighting>>, FetchError> {
    match classify(payload.content_type.as_deref(), &payload.body) {
        PayloadFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(&payload.body)?;
            Ok(Some(parse_json(&value, source)))
        }
        PayloadFormat::Delimited => Ok(Some(parse_delimited(&payload.body, source))),
        PayloadFormat::Unknown => Ok(serde_json::from_str::<serde_json::Value>(&payload.body)
            .ok()
            .map(|value| parse_json(&value, source))),
    }
}

/// Retrieve and parse a single source
pub async fn fetch_source(
    client: &dyn SourceClient,
    url: &str,
) -> Result<Option<Vec<Sighting>>, FetchError> {
    let payload = client.get(url).await?;
    if payload.status != 200 {
        return Err(FetchError::Status(payload.status));
    }
    parse_payload(&payload, url)
}

/// Outcome of fetching every configured source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub success_count: usize,
    /// Sources whose parser ran, in configured order
    pub used_sources: Vec<String>,
}

/// Fans out source retrieval and merges results into an index
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn SourceClient>,
}

impl Fetcher {
    pub fn new(client: Arc<dyn SourceClient>) -> Self {
        Self { client }
    }

    /// Fetch all `urls` concurrently, merging every parsed address into `index`
    ///
    /// A zero `success_count` means nothing usable came back; the caller
    /// decides whether to fall back to the snapshot.
    pub async fn fetch_all(&self, urls: &[String], index: &mut AddressIndex) -> FetchSummary {
        let mut tasks = JoinSet::new();
        for (position, url) in urls.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let url = url.clone();
            tasks.spawn(async move {
                let result = fetch_source(client.as_ref(), &url).await;
                (position, url, result)
            });
        }

        let mut used: Vec<(usize, String)> = Vec::with_capacity(urls.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, url, Ok(Some(sightings)))) => {
                    let seen = sightings.len();
                    let added = index.extend(sightings);
                    log::info!("📥 {}: {} candidates, {} new entries", url, seen, added);
                    used.push((position, url));
                }
                Ok((_, url, Ok(None))) => {
                    log::debug!("Ignoring {}: unrecognized payload format", url);
                }
                Ok((_, url, Err(e))) => {
                    log::warn!("⚠️  fetch failed for {}: {}", url, e);
                }
                Err(e) => {
                    log::error!("❌ source task aborted: {}", e);
                }
            }
        }

        used.sort_by_key(|(position, _)| *position);
        FetchSummary {
            success_count: used.len(),
            used_sources: used.into_iter().map(|(_, url)| url).collect(),
        }
    }
}

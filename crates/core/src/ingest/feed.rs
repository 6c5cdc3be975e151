use crate::config::{env_or, Settings};
use crate::domain::record::Record;
use crate::error::FetchError;
use crate::ingest::types::FeedPage;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const MAX_RETRIES: u32 = 10;
const DEFAULT_MAX_PAGES: usize = 1;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Remote source of analyst rating actions.
#[async_trait::async_trait]
pub trait DataFeed: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<Record>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpDataFeed {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
    retries: u32,
    max_pages: usize,
    backoff: Duration,
}

impl HttpDataFeed {
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build data feed http client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            auth_token,
            retries: DEFAULT_RETRIES,
            max_pages: DEFAULT_MAX_PAGES,
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let endpoint = settings.require_data_feed_url()?;
        let timeout_secs = env_or("DATA_FEED_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);

        Ok(Self::new(
            endpoint,
            settings.data_feed_token.clone(),
            Duration::from_secs(timeout_secs),
        )?
        .with_retries(env_or("DATA_FEED_RETRIES", DEFAULT_RETRIES))
        .with_max_pages(env_or("DATA_FEED_MAX_PAGES", DEFAULT_MAX_PAGES)))
    }

    /// Attempts per page, clamped to `1..=10` so the backoff doubling stays bounded.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.clamp(1, MAX_RETRIES);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Delay before the first retry; doubles on every further attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| FetchError::Malformed("auth token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn fetch_page_once(&self, cursor: Option<&str>) -> Result<FeedPage, FetchError> {
        let mut req = self.http.get(&self.endpoint).headers(self.headers()?);
        if let Some(cursor) = cursor {
            req = req.query(&[("next_page", cursor)]);
        }

        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: text });
        }

        decode_page(&text)
    }

    async fn fetch_page(&self, cursor: Option<&str>) -> Result<FeedPage, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_page_once(cursor).await {
                Ok(mut page) => {
                    validate_page(&mut page)?;
                    return Ok(page);
                }
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = self.backoff * (1u32 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "data feed fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl DataFeed for HttpDataFeed {
    fn source_name(&self) -> &'static str {
        "http_json"
    }

    async fn fetch(&self) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        for page_idx in 0..self.max_pages {
            let page = self.fetch_page(cursor.as_deref()).await?;
            tracing::debug!(page_idx, items = page.items.len(), "data feed page fetched");

            cursor = page.next_cursor().map(str::to_string);
            records.extend(page.items);

            if cursor.is_none() {
                break;
            }
        }

        Ok(records)
    }
}

/// Parses and validates one page body.
pub fn parse_page(text: &str) -> Result<FeedPage, FetchError> {
    let mut page = decode_page(text)?;
    validate_page(&mut page)?;
    Ok(page)
}

fn decode_page(text: &str) -> Result<FeedPage, FetchError> {
    serde_json::from_str::<FeedPage>(text)
        .map_err(|e| FetchError::Malformed(format!("unexpected page shape: {e}")))
}

fn validate_page(page: &mut FeedPage) -> Result<(), FetchError> {
    for record in &mut page.items {
        validate_record(record)?;
    }
    Ok(())
}

fn validate_record(record: &mut Record) -> Result<(), FetchError> {
    let ticker = record.ticker.trim();
    if ticker.is_empty() {
        return Err(FetchError::Malformed("ticker must be non-empty".into()));
    }
    if ticker.len() != record.ticker.len() {
        record.ticker = ticker.to_string();
    }
    Ok(())
}

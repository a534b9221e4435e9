// src/providers/finnhub.rs
// Company-news provider. Requires an API key; unconfigured means zero
// results, not an error. Finnhub is the one equity upstream that may embed
// its own sentiment, surfaced as `SentimentHint::Provided`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::model::{Article, NewsSource, SentimentHint, SentimentLabel};
use crate::providers::{http_client, NewsProvider, BROWSER_USER_AGENT};

/// Look back one week of company news per fetch.
const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct NewsItem {
    headline: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    url: Option<String>,
    datetime: Option<i64>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
}

pub struct FinnhubProvider {
    api_key: Option<String>,
    mode: Mode,
}

enum Mode {
    Http { client: reqwest::Client },
    Fixture(String),
}

impl FinnhubProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            mode: Mode::Http {
                client: http_client(BROWSER_USER_AGENT),
            },
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            api_key: Some("fixture".to_string()),
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<Article>> {
        let items: Vec<NewsItem> =
            serde_json::from_str(body).context("parsing finnhub company news")?;
        Ok(items.into_iter().filter_map(to_article).collect())
    }
}

fn to_article(item: NewsItem) -> Option<Article> {
    let title = item.headline.filter(|t| !t.is_empty())?;
    let url = item.url.filter(|u| !u.is_empty())?;
    Some(Article {
        source: NewsSource::Finnhub,
        title,
        summary: item.summary.filter(|s| !s.is_empty()),
        url,
        published_at: item
            .datetime
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::UNIX_EPOCH),
        publisher: item.source.filter(|s| !s.is_empty()),
        thumbnail_url: item.image.filter(|i| !i.is_empty()),
        article_type: Default::default(),
        category: None,
        sentiment: item
            .sentiment
            .as_deref()
            .and_then(SentimentLabel::parse)
            .map(SentimentHint::Provided)
            .unwrap_or(SentimentHint::Compute),
    })
}

#[async_trait]
impl NewsProvider for FinnhubProvider {
    async fn fetch(&self, symbol: &str) -> Result<Vec<Article>> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) else {
            // Feature not configured.
            return Ok(Vec::new());
        };
        match &self.mode {
            Mode::Fixture(body) => Self::parse(body),
            Mode::Http { client } => {
                let to = Utc::now();
                let from = to - Duration::days(WINDOW_DAYS);
                let url = format!(
                    "https://finnhub.io/api/v1/company-news?symbol={symbol}&from={}&to={}&token={api_key}",
                    from.format("%Y-%m-%d"),
                    to.format("%Y-%m-%d"),
                );
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .context("finnhub news request")?
                    .error_for_status()
                    .context("finnhub news status")?;
                let body = resp.text().await.context("finnhub news body")?;
                Self::parse(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "finnhub"
    }

    fn source(&self) -> NewsSource {
        NewsSource::Finnhub
    }
}

// src/providers/yahoo.rs
// General web-news provider backed by the public Yahoo Finance search feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use crate::model::{Article, NewsSource, SentimentHint};
use crate::providers::{http_client, NewsProvider, BROWSER_USER_AGENT};

const NEWS_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    link: Option<String>,
    #[serde(rename = "providerPublishTime")]
    provider_publish_time: Option<i64>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    resolutions: Vec<Resolution>,
}

#[derive(Debug, Deserialize)]
struct Resolution {
    url: Option<String>,
}

pub struct YahooProvider {
    mode: Mode,
}

enum Mode {
    Http { client: reqwest::Client },
    Fixture(String),
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            mode: Mode::Http {
                client: http_client(BROWSER_USER_AGENT),
            },
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<Article>> {
        let resp: SearchResponse =
            serde_json::from_str(body).context("parsing yahoo search response")?;
        Ok(resp.news.into_iter().filter_map(to_article).collect())
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn to_article(item: NewsItem) -> Option<Article> {
    // Items without a title or link carry no usable identity; skip them.
    let title = item.title.filter(|t| !t.is_empty())?;
    let url = item.link.filter(|u| !u.is_empty())?;
    Some(Article {
        source: NewsSource::Yahoo,
        title,
        summary: item.summary.filter(|s| !s.is_empty()),
        url,
        published_at: item
            .provider_publish_time
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::UNIX_EPOCH),
        publisher: item.publisher.filter(|p| !p.is_empty()),
        thumbnail_url: item
            .thumbnail
            .and_then(|t| t.resolutions.into_iter().next())
            .and_then(|r| r.url),
        article_type: Default::default(),
        category: None,
        sentiment: SentimentHint::Compute,
    })
}

#[async_trait]
impl NewsProvider for YahooProvider {
    async fn fetch(&self, symbol: &str) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse(body),
            Mode::Http { client } => {
                let url = format!(
                    "https://query1.finance.yahoo.com/v1/finance/search?q={symbol}&newsCount={NEWS_COUNT}"
                );
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .context("yahoo search request")?
                    .error_for_status()
                    .context("yahoo search status")?;
                let body = resp.text().await.context("yahoo search body")?;
                Self::parse(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn source(&self) -> NewsSource {
        NewsSource::Yahoo
    }
}

// src/providers/sec_edgar.rs
// Filings provider backed by the SEC EDGAR Atom feed. EDGAR policy requires
// an organization-identifying User-Agent string on every request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::model::{Article, ArticleType, NewsSource, SentimentHint};
use crate::providers::{http_client, NewsProvider};

/// Keep only the most recent filings per fetch.
const MAX_FILINGS: usize = 5;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: Option<String>,
}

pub struct SecEdgarProvider {
    mode: Mode,
}

enum Mode {
    Http { client: reqwest::Client },
    Fixture(String),
}

impl SecEdgarProvider {
    pub fn new(user_agent: String) -> Self {
        Self {
            mode: Mode::Http {
                client: http_client(&user_agent),
            },
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<Article>> {
        let feed: Feed = from_str(body).context("parsing edgar atom feed")?;
        Ok(feed
            .entries
            .into_iter()
            .take(MAX_FILINGS)
            .filter_map(to_article)
            .collect())
    }
}

fn to_article(entry: Entry) -> Option<Article> {
    let title = entry.title.filter(|t| !t.is_empty())?;
    let url = entry
        .links
        .into_iter()
        .find_map(|l| l.href)
        .filter(|u| !u.is_empty())?;
    Some(Article {
        source: NewsSource::SecEdgar,
        title,
        summary: Some("SEC Filing".to_string()),
        url,
        published_at: entry
            .updated
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH),
        publisher: Some("SEC EDGAR".to_string()),
        thumbnail_url: None,
        article_type: ArticleType::Filing,
        category: None,
        sentiment: SentimentHint::Compute,
    })
}

#[async_trait]
impl NewsProvider for SecEdgarProvider {
    async fn fetch(&self, symbol: &str) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse(body),
            Mode::Http { client } => {
                let url = format!(
                    "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK={symbol}&type=&dateb=&owner=exclude&count=10&output=atom"
                );
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .context("edgar filings request")?
                    .error_for_status()
                    .context("edgar filings status")?;
                let body = resp.text().await.context("edgar filings body")?;
                Self::parse(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "sec"
    }

    fn source(&self) -> NewsSource {
        NewsSource::SecEdgar
    }
}

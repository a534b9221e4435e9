// src/providers/cryptopanic.rs
// Community/social crypto-news provider. Symbols are routed through the
// fixed coin-code map; anything unmapped yields zero results without error.
// Community votes embed a sentiment, so every post arrives with a provided
// label.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;

use crate::coins::coin_code;
use crate::model::{Article, NewsSource, SentimentHint, SentimentLabel};
use crate::providers::{http_client, NewsProvider, BROWSER_USER_AGENT};

/// Keep only the freshest posts per fetch.
const MAX_POSTS: usize = 10;

#[derive(Debug, Deserialize)]
struct Posts {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    #[serde(default)]
    source: Option<PostSource>,
    #[serde(default)]
    votes: Option<Votes>,
}

#[derive(Debug, Deserialize)]
struct PostSource {
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Votes {
    #[serde(default)]
    positive: i64,
    #[serde(default)]
    negative: i64,
}

pub struct CryptoPanicProvider {
    mode: Mode,
}

enum Mode {
    Http { client: reqwest::Client },
    Fixture(String),
}

impl CryptoPanicProvider {
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
        let posts: Posts = serde_json::from_str(body).context("parsing cryptopanic posts")?;
        Ok(posts
            .results
            .into_iter()
            .take(MAX_POSTS)
            .filter_map(to_article)
            .collect())
    }
}

impl Default for CryptoPanicProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn vote_sentiment(votes: &Votes) -> SentimentLabel {
    match votes.positive.cmp(&votes.negative) {
        Ordering::Greater => SentimentLabel::Positive,
        Ordering::Less => SentimentLabel::Negative,
        Ordering::Equal => SentimentLabel::Neutral,
    }
}

fn to_article(post: Post) -> Option<Article> {
    let title = post.title.filter(|t| !t.is_empty())?;
    let url = post.url.filter(|u| !u.is_empty())?;
    let votes = post.votes.unwrap_or_default();
    Some(Article {
        source: NewsSource::CryptoPanic,
        title,
        summary: None,
        url,
        published_at: post
            .published_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH),
        publisher: post
            .source
            .and_then(|s| s.title)
            .or_else(|| Some("CryptoPanic".to_string())),
        thumbnail_url: None,
        article_type: Default::default(),
        category: None,
        sentiment: SentimentHint::Provided(vote_sentiment(&votes)),
    })
}

#[async_trait]
impl NewsProvider for CryptoPanicProvider {
    async fn fetch(&self, symbol: &str) -> Result<Vec<Article>> {
        let Some(currency) = coin_code(symbol) else {
            // Unmapped symbol: zero results, no error.
            return Ok(Vec::new());
        };
        match &self.mode {
            Mode::Fixture(body) => Self::parse(body),
            Mode::Http { client } => {
                let url = format!(
                    "https://cryptopanic.com/api/v1/posts/?auth_token=free&currencies={currency}&public=true"
                );
                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .context("cryptopanic posts request")?
                    .error_for_status()
                    .context("cryptopanic posts status")?;
                let body = resp.text().await.context("cryptopanic posts body")?;
                Self::parse(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "cryptopanic"
    }

    fn source(&self) -> NewsSource {
        NewsSource::CryptoPanic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unmapped_symbol_returns_empty_without_error() {
        let provider = CryptoPanicProvider::from_fixture("{}");
        let articles = provider.fetch("FOO-USD").await.unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn tied_votes_are_neutral() {
        let v = Votes {
            positive: 2,
            negative: 2,
        };
        assert_eq!(vote_sentiment(&v), SentimentLabel::Neutral);
        let v = Votes {
            positive: 3,
            negative: 1,
        };
        assert_eq!(vote_sentiment(&v), SentimentLabel::Positive);
    }
}

// src/store.rs
// Narrow persistence contract: idempotent upsert keyed on the canonical
// URL, filtered retrieval ordered by recency. The in-memory implementation
// backs tests and the default pipeline wiring; a relational backend plugs
// in behind the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{Article, ArticleType, Category, SentimentLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The URL was new and a record was created.
    Saved,
    /// The URL was already present; the record is refreshed in place but
    /// not counted as new.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ArticleQuery {
    pub ticker: Option<String>,
    pub article_type: Option<ArticleType>,
    pub category: Option<Category>,
    pub sentiment: Option<SentimentLabel>,
    pub since: Option<DateTime<Utc>>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            ticker: None,
            article_type: None,
            category: None,
            sentiment: None,
            since: None,
            limit: 50,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Idempotent on URL: a second upsert of the same article leaves one
    /// record, with the newer classification/sentiment superseding.
    async fn upsert_by_url(&self, symbol: &str, article: &Article) -> Result<Upsert>;
    /// Filtered retrieval, ordered by `published_at` descending.
    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>>;
}

#[derive(Debug, Clone)]
struct StoredArticle {
    symbol: String,
    article: Article,
}

/// URL-keyed in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, StoredArticle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn upsert_by_url(&self, symbol: &str, article: &Article) -> Result<Upsert> {
        let mut map = self.inner.write().unwrap();
        let previous = map.insert(
            article.url.clone(),
            StoredArticle {
                symbol: symbol.to_string(),
                article: article.clone(),
            },
        );
        Ok(if previous.is_none() {
            Upsert::Saved
        } else {
            Upsert::Skipped
        })
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let map = self.inner.read().unwrap();
        let mut hits: Vec<Article> = map
            .values()
            .filter(|stored| {
                let a = &stored.article;
                query
                    .ticker
                    .as_deref()
                    .map(|t| stored.symbol.eq_ignore_ascii_case(t))
                    .unwrap_or(true)
                    && query.article_type.map(|t| a.article_type == t).unwrap_or(true)
                    && query.category.map(|c| a.category == Some(c)).unwrap_or(true)
                    && query
                        .sentiment
                        .map(|s| a.sentiment.provided() == Some(s))
                        .unwrap_or(true)
                    && query.since.map(|ts| a.published_at >= ts).unwrap_or(true)
            })
            .map(|stored| stored.article.clone())
            .collect();
        hits.sort_by(|a, b| b.published_at.cmp(&a.published_at).then_with(|| a.url.cmp(&b.url)));

        let hits = hits.into_iter().skip(query.offset);
        Ok(if query.limit > 0 {
            hits.take(query.limit).collect()
        } else {
            hits.collect()
        })
    }
}

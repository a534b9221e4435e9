// tests/pipeline_refresh.rs
// End-to-end refresh: stub providers feed the aggregator, the pipeline
// classifies, resolves sentiment and persists into the in-memory store.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use portfolio_news::aggregate::{FetchOptions, NewsAggregator};
use portfolio_news::model::{
    Article, ArticleType, Category, NewsSource, SentimentHint, SentimentLabel,
};
use portfolio_news::pipeline::NewsPipeline;
use portfolio_news::providers::NewsProvider;
use portfolio_news::sentiment::SentimentEngine;
use portfolio_news::store::{ArticleQuery, ArticleStore, MemoryStore};

struct StubProvider {
    source: NewsSource,
    articles: Vec<Article>,
    fail: bool,
}

#[async_trait]
impl NewsProvider for StubProvider {
    async fn fetch(&self, _symbol: &str) -> Result<Vec<Article>> {
        if self.fail {
            return Err(anyhow!("upstream unavailable"));
        }
        Ok(self.articles.clone())
    }
    fn name(&self) -> &'static str {
        "stub"
    }
    fn source(&self) -> NewsSource {
        self.source
    }
}

fn article(source: NewsSource, url: &str, title: &str, secs: i64) -> Article {
    Article {
        source,
        title: title.to_string(),
        summary: None,
        url: url.to_string(),
        published_at: Utc.timestamp_opt(secs, 0).unwrap(),
        publisher: None,
        thumbnail_url: None,
        article_type: ArticleType::Article,
        category: None,
        sentiment: SentimentHint::Compute,
    }
}

fn pipeline(providers: Vec<Arc<dyn NewsProvider>>, store: Arc<MemoryStore>) -> NewsPipeline {
    NewsPipeline::new(
        NewsAggregator::new(providers),
        SentimentEngine::new(),
        store,
    )
}

#[tokio::test]
async fn refresh_classifies_scores_and_persists() {
    let mut earnings = article(
        NewsSource::Yahoo,
        "https://example.com/earnings",
        "Company reports record earnings and strong profit growth",
        300,
    );
    earnings.summary = Some("Revenue beats expectations".to_string());
    let mut provided = article(
        NewsSource::Finnhub,
        "https://example.com/provided",
        "the quick brown fox jumps over the lazy dog",
        200,
    );
    provided.sentiment = SentimentHint::Provided(SentimentLabel::Negative);

    let store = Arc::new(MemoryStore::new());
    let pipe = pipeline(
        vec![
            Arc::new(StubProvider {
                source: NewsSource::Yahoo,
                articles: vec![earnings],
                fail: false,
            }),
            Arc::new(StubProvider {
                source: NewsSource::Finnhub,
                articles: vec![provided],
                fail: false,
            }),
        ],
        store.clone(),
    );

    let stats = pipe.refresh_symbol("AAPL", &FetchOptions::default()).await;
    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.saved, 2);
    assert_eq!(stats.skipped, 0);

    let stored = store.query(&ArticleQuery::default()).await.unwrap();
    assert_eq!(stored.len(), 2);

    let earnings = stored
        .iter()
        .find(|a| a.url == "https://example.com/earnings")
        .unwrap();
    assert_eq!(earnings.article_type, ArticleType::Earnings);
    assert_eq!(earnings.category, Some(Category::Earnings));
    assert_eq!(
        earnings.sentiment,
        SentimentHint::Provided(SentimentLabel::Positive)
    );

    // Provider-supplied sentiment survives even though the text is neutral.
    let provided = stored
        .iter()
        .find(|a| a.url == "https://example.com/provided")
        .unwrap();
    assert_eq!(
        provided.sentiment,
        SentimentHint::Provided(SentimentLabel::Negative)
    );
}

#[tokio::test]
async fn re_refresh_skips_already_stored_articles() {
    let a = article(
        NewsSource::Yahoo,
        "https://example.com/one",
        "Quiet session",
        100,
    );
    let store = Arc::new(MemoryStore::new());
    let pipe = pipeline(
        vec![Arc::new(StubProvider {
            source: NewsSource::Yahoo,
            articles: vec![a],
            fail: false,
        })],
        store.clone(),
    );

    let first = pipe.refresh_symbol("AAPL", &FetchOptions::default()).await;
    assert_eq!(first.saved, 1);
    let second = pipe.refresh_symbol("AAPL", &FetchOptions::default()).await;
    assert_eq!(second.fetched, 1);
    assert_eq!(second.saved, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn batch_refresh_isolates_failing_symbols() {
    let a = article(
        NewsSource::Yahoo,
        "https://example.com/one",
        "Quiet session",
        100,
    );
    let store = Arc::new(MemoryStore::new());
    // The only provider is the crypto feed, so equity symbols fetch nothing
    // while BTC-USD still refreshes.
    let pipe = pipeline(
        vec![
            Arc::new(StubProvider {
                source: NewsSource::CryptoPanic,
                articles: vec![a],
                fail: false,
            }),
            Arc::new(StubProvider {
                source: NewsSource::Yahoo,
                articles: vec![],
                fail: true,
            }),
        ],
        store.clone(),
    );

    let symbols = vec!["AAPL".to_string(), "BTC-USD".to_string()];
    let batch = pipe.refresh_symbols(&symbols, &FetchOptions::default()).await;
    assert_eq!(batch.symbols, 2);
    assert_eq!(batch.with_results, 1);
    assert_eq!(batch.totals.fetched, 1);
    assert_eq!(batch.totals.saved, 1);
    assert_eq!(store.len(), 1);
}

// tests/store_queries.rs
// Persistence contract against the in-memory store: idempotent upserts and
// filtered, recency-ordered retrieval.

use chrono::{TimeZone, Utc};
use portfolio_news::model::{Article, ArticleType, Category, NewsSource, SentimentHint, SentimentLabel};
use portfolio_news::store::{ArticleQuery, ArticleStore, MemoryStore};

fn article(url: &str, secs: i64) -> Article {
    Article {
        source: NewsSource::Yahoo,
        title: format!("story {url}"),
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

#[tokio::test]
async fn same_url_upserts_collapse_to_one_record() {
    let store = MemoryStore::new();
    let mut a = article("https://example.com/one", 100);
    store.upsert_by_url("AAPL", &a).await.unwrap();

    a.article_type = ArticleType::Dividend;
    a.category = Some(Category::Dividends);
    a.sentiment = SentimentHint::Provided(SentimentLabel::Negative);
    store.upsert_by_url("AAPL", &a).await.unwrap();

    let hits = store.query(&ArticleQuery::default()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].article_type, ArticleType::Dividend);
    assert_eq!(
        hits[0].sentiment,
        SentimentHint::Provided(SentimentLabel::Negative)
    );
}

#[tokio::test]
async fn filters_compose_and_results_are_newest_first() {
    let store = MemoryStore::new();

    let mut earnings = article("https://example.com/earnings", 300);
    earnings.article_type = ArticleType::Earnings;
    earnings.category = Some(Category::Earnings);
    earnings.sentiment = SentimentHint::Provided(SentimentLabel::Positive);
    store.upsert_by_url("AAPL", &earnings).await.unwrap();

    let mut filing = article("https://example.com/filing", 200);
    filing.article_type = ArticleType::Filing;
    filing.category = Some(Category::Regulation);
    filing.sentiment = SentimentHint::Provided(SentimentLabel::Neutral);
    store.upsert_by_url("AAPL", &filing).await.unwrap();

    let mut crypto = article("https://example.com/crypto", 400);
    crypto.sentiment = SentimentHint::Provided(SentimentLabel::Positive);
    store.upsert_by_url("BTC-USD", &crypto).await.unwrap();

    let all = store.query(&ArticleQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].url, "https://example.com/crypto");
    assert_eq!(all[2].url, "https://example.com/filing");

    let aapl_only = store
        .query(&ArticleQuery {
            ticker: Some("aapl".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(aapl_only.len(), 2);

    let positive_aapl = store
        .query(&ArticleQuery {
            ticker: Some("AAPL".to_string()),
            sentiment: Some(SentimentLabel::Positive),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(positive_aapl.len(), 1);
    assert_eq!(positive_aapl[0].url, "https://example.com/earnings");

    let filings = store
        .query(&ArticleQuery {
            article_type: Some(ArticleType::Filing),
            category: Some(Category::Regulation),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filings.len(), 1);

    let recent = store
        .query(&ArticleQuery {
            since: Some(Utc.timestamp_opt(250, 0).unwrap()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
async fn limit_and_offset_page_through_results() {
    let store = MemoryStore::new();
    for i in 0..5 {
        let a = article(&format!("https://example.com/{i}"), i * 100);
        store.upsert_by_url("AAPL", &a).await.unwrap();
    }

    let page = store
        .query(&ArticleQuery {
            limit: 2,
            offset: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    // Newest first, offset skips the newest.
    assert_eq!(page[0].url, "https://example.com/3");
    assert_eq!(page[1].url, "https://example.com/2");
}

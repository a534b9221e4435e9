// src/pipeline.rs
// Refresh orchestration: aggregate -> classify -> resolve sentiment ->
// upsert. This is the unit of work the scheduler runs periodically.

use std::sync::Arc;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::aggregate::{FetchOptions, NewsAggregator};
use crate::classify::classify;
use crate::model::SentimentHint;
use crate::sentiment::{ScoreOptions, SentimentEngine};
use crate::store::{ArticleStore, Upsert};

/// One-time metrics registration so series show up on the host's exporter.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_articles_fetched_total",
            "Articles returned by the aggregator across refreshes."
        );
        describe_counter!(
            "news_articles_saved_total",
            "Articles upserted into the store."
        );
        describe_counter!(
            "news_articles_skipped_total",
            "Articles already stored or failing persistence."
        );
        describe_counter!(
            "news_provider_errors_total",
            "Provider fetch/parse errors absorbed by the aggregator."
        );
        describe_gauge!(
            "news_refresh_last_run_ts",
            "Unix ts when a news refresh last completed."
        );
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub fetched: usize,
    pub saved: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchRefreshStats {
    pub symbols: usize,
    /// Symbols for which at least one article was fetched.
    pub with_results: usize,
    pub totals: RefreshStats,
}

pub struct NewsPipeline {
    aggregator: NewsAggregator,
    engine: SentimentEngine,
    store: Arc<dyn ArticleStore>,
}

impl NewsPipeline {
    pub fn new(
        aggregator: NewsAggregator,
        engine: SentimentEngine,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            aggregator,
            engine,
            store,
        }
    }

    /// Fetch, enrich and persist news for one symbol. Infallible: upstream
    /// failures degrade to fewer articles, and articles that are already
    /// stored or fail to persist are counted as skipped.
    pub async fn refresh_symbol(&self, symbol: &str, opts: &FetchOptions) -> RefreshStats {
        ensure_metrics_described();

        let mut articles = self.aggregator.news_for_symbol(symbol, opts).await;
        let mut stats = RefreshStats {
            fetched: articles.len(),
            ..Default::default()
        };
        counter!("news_articles_fetched_total").increment(articles.len() as u64);

        let score_opts = ScoreOptions::default();
        for article in &mut articles {
            let (article_type, category) = classify(article);
            article.article_type = article_type;
            article.category = category;

            // Provider-supplied sentiment takes precedence over computing.
            let label = match article.sentiment {
                SentimentHint::Provided(label) => label,
                SentimentHint::Compute => {
                    self.engine.score_article(article, &score_opts).await.label
                }
            };
            article.sentiment = SentimentHint::Provided(label);

            match self.store.upsert_by_url(symbol, article).await {
                Ok(Upsert::Saved) => stats.saved += 1,
                Ok(Upsert::Skipped) => stats.skipped += 1,
                Err(e) => {
                    tracing::warn!(error = ?e, symbol, url = %article.url, "article upsert failed");
                    stats.skipped += 1;
                }
            }
        }

        counter!("news_articles_saved_total").increment(stats.saved as u64);
        counter!("news_articles_skipped_total").increment(stats.skipped as u64);
        gauge!("news_refresh_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        tracing::info!(
            symbol,
            fetched = stats.fetched,
            saved = stats.saved,
            skipped = stats.skipped,
            "news refresh complete"
        );
        stats
    }

    /// Refresh a symbol set sequentially with per-symbol isolation; one
    /// empty or degraded symbol never aborts the batch.
    pub async fn refresh_symbols(&self, symbols: &[String], opts: &FetchOptions) -> BatchRefreshStats {
        let mut batch = BatchRefreshStats {
            symbols: symbols.len(),
            ..Default::default()
        };
        for symbol in symbols {
            let stats = self.refresh_symbol(symbol, opts).await;
            if stats.fetched > 0 {
                batch.with_results += 1;
            }
            batch.totals.fetched += stats.fetched;
            batch.totals.saved += stats.saved;
            batch.totals.skipped += stats.skipped;
        }
        tracing::info!(
            symbols = batch.symbols,
            with_results = batch.with_results,
            fetched = batch.totals.fetched,
            saved = batch.totals.saved,
            "batch news refresh complete"
        );
        batch
    }
}

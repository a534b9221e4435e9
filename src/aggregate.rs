// src/aggregate.rs
// Fan-out aggregator: queries the applicable providers for a symbol
// concurrently, merges and deduplicates by canonical URL, sorts by recency
// and truncates. One provider failing never blocks or discards the others.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;

use crate::coins::is_crypto_symbol;
use crate::config::AppConfig;
use crate::model::{Article, NewsSource, SentimentHint};
use crate::providers::{build_providers, NewsProvider};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum articles returned; 0 short-circuits to an empty list.
    pub limit: usize,
    /// Equity providers to query. Crypto symbols ignore this and go to the
    /// community provider only.
    pub sources: Vec<NewsSource>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            sources: vec![NewsSource::Yahoo, NewsSource::Finnhub, NewsSource::SecEdgar],
        }
    }
}

pub struct NewsAggregator {
    providers: Vec<Arc<dyn NewsProvider>>,
}

impl NewsAggregator {
    pub fn new(providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(build_providers(cfg))
    }

    /// Merged, deduplicated article list for a symbol, newest first.
    /// Partial provider failure degrades to a smaller result set; zero
    /// providers returning data yields an empty list, not an error.
    pub async fn news_for_symbol(&self, symbol: &str, opts: &FetchOptions) -> Vec<Article> {
        if opts.limit == 0 {
            return Vec::new();
        }

        // Crypto symbols do not exist in the equity indexes; route them to
        // the community provider only.
        let crypto = is_crypto_symbol(symbol);
        let selected: Vec<&Arc<dyn NewsProvider>> = self
            .providers
            .iter()
            .filter(|p| {
                if crypto {
                    p.source() == NewsSource::CryptoPanic
                } else {
                    p.source() != NewsSource::CryptoPanic && opts.sources.contains(&p.source())
                }
            })
            .collect();

        let fetches = selected.iter().map(|p| {
            let provider = Arc::clone(p);
            async move {
                match provider.fetch(symbol).await {
                    Ok(articles) => articles,
                    Err(e) => {
                        tracing::warn!(
                            error = ?e,
                            provider = provider.name(),
                            symbol,
                            "provider fetch failed"
                        );
                        counter!("news_provider_errors_total").increment(1);
                        Vec::new()
                    }
                }
            }
        });
        // Settle all branches; completion order never leaks into the output
        // because join_all preserves input order and we sort afterwards.
        let batches = futures::future::join_all(fetches).await;

        let mut by_url: HashMap<String, Article> = HashMap::new();
        for article in batches.into_iter().flatten() {
            match by_url.entry(article.url.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(article);
                }
                Entry::Occupied(mut slot) => {
                    // Last write wins, except a provider-supplied sentiment
                    // is not displaced by one that would need computing.
                    let keep_existing = matches!(slot.get().sentiment, SentimentHint::Provided(_))
                        && matches!(article.sentiment, SentimentHint::Compute);
                    if !keep_existing {
                        slot.insert(article);
                    }
                }
            }
        }

        let mut merged: Vec<Article> = by_url.into_values().collect();
        merged.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.url.cmp(&b.url))
        });
        merged.truncate(opts.limit);
        merged
    }
}

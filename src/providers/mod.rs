// src/providers/mod.rs
pub mod cryptopanic;
pub mod finnhub;
pub mod sec_edgar;
pub mod yahoo;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::model::{Article, NewsSource};

pub use cryptopanic::CryptoPanicProvider;
pub use finnhub::FinnhubProvider;
pub use sec_edgar::SecEdgarProvider;
pub use yahoo::YahooProvider;

/// Browser-style identification expected by the public news endpoints.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One news source. Implementations normalize their upstream payload into
/// `Article` at this boundary; an `Err` is treated by the aggregator as
/// zero results for that provider.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
    fn source(&self) -> NewsSource;
}

pub(crate) fn http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
}

/// The full provider set for a configuration; the aggregator decides which
/// of them apply to a given symbol.
pub fn build_providers(cfg: &AppConfig) -> Vec<Arc<dyn NewsProvider>> {
    vec![
        Arc::new(YahooProvider::new()),
        Arc::new(FinnhubProvider::new(cfg.finnhub_api_key.clone())),
        Arc::new(SecEdgarProvider::new(cfg.sec_user_agent.clone())),
        Arc::new(CryptoPanicProvider::new()),
    ]
}

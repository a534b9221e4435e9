// src/lib.rs
// Financial news ingestion and sentiment core. This crate is a library:
// the HTTP-serving layer, authentication and trading integrations live in
// the host application and are out of scope here.

pub mod aggregate;
pub mod classify;
pub mod coins;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod scheduler;
pub mod sentiment;
pub mod store;

// ---- Re-exports for stable public API ----
pub use aggregate::{FetchOptions, NewsAggregator};
pub use config::{AppConfig, SentimentApiConfig};
pub use model::{
    AggregateSentiment, Article, ArticleType, Category, NewsSource, SentimentHint, SentimentLabel,
    SentimentResult,
};
pub use pipeline::{BatchRefreshStats, NewsPipeline, RefreshStats};
pub use scheduler::{JobOptions, JobScheduler, JobStatus};
pub use sentiment::{ScoreOptions, SentimentEngine};
pub use store::{ArticleQuery, ArticleStore, MemoryStore, Upsert};

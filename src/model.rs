// src/model.rs
// Canonical article shape shared by every provider, plus the sentiment
// result types returned by the engine. Provider-specific payloads are
// normalized into `Article` at the adapter boundary and never leak past it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scorer tag for the empty-input / empty-set short circuit.
pub const TAG_NONE: &str = "none";
/// Scorer tag for the deterministic local lexicon path.
pub const TAG_LOCAL: &str = "local-dictionary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSource {
    Yahoo,
    Finnhub,
    #[serde(rename = "sec")]
    SecEdgar,
    CryptoPanic,
}

impl NewsSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsSource::Yahoo => "yahoo",
            NewsSource::Finnhub => "finnhub",
            NewsSource::SecEdgar => "sec",
            NewsSource::CryptoPanic => "cryptopanic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    #[default]
    Article,
    Filing,
    Earnings,
    Dividend,
    Merger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Earnings,
    Dividends,
    Merger,
    Acquisition,
    Regulation,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label is a pure function of score against a symmetric threshold:
    /// ±20 for single texts and articles, ±15 for aggregates.
    pub fn from_score(score: i32, threshold: i32) -> Self {
        if score > threshold {
            SentimentLabel::Positive
        } else if score < -threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

/// Some upstreams (community feeds, news APIs with native scoring) embed
/// their own sentiment. Precedence is explicit: a provided label wins over
/// local computation, never a truthiness check on an optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<SentimentLabel>", into = "Option<SentimentLabel>")]
pub enum SentimentHint {
    Provided(SentimentLabel),
    #[default]
    Compute,
}

impl SentimentHint {
    pub fn provided(&self) -> Option<SentimentLabel> {
        match self {
            SentimentHint::Provided(label) => Some(*label),
            SentimentHint::Compute => None,
        }
    }
}

impl From<Option<SentimentLabel>> for SentimentHint {
    fn from(v: Option<SentimentLabel>) -> Self {
        match v {
            Some(label) => SentimentHint::Provided(label),
            None => SentimentHint::Compute,
        }
    }
}

impl From<SentimentHint> for Option<SentimentLabel> {
    fn from(v: SentimentHint) -> Self {
        v.provided()
    }
}

/// One normalized news item. `url` is the identity key: two articles with
/// the same URL are the same entity for dedup and upsert purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: NewsSource,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "type", default)]
    pub article_type: ArticleType,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub sentiment: SentimentHint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    /// -100..=100.
    pub score: i32,
    pub label: SentimentLabel,
    /// 0..=100, share of tokens that matched the lexicon (local path) or
    /// the winning probability (external path).
    pub confidence: i32,
    /// Which scorer produced this result, e.g. "huggingface-finbert" or
    /// "local-dictionary".
    pub source_tag: String,
}

impl SentimentResult {
    /// The fixed result for empty or whitespace-only input.
    pub fn none() -> Self {
        Self {
            score: 0,
            label: SentimentLabel::Neutral,
            confidence: 0,
            source_tag: TAG_NONE.to_string(),
        }
    }
}

/// Derived view over a set of scored articles. Recomputed on demand,
/// never persisted as authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSentiment {
    pub overall: SentimentLabel,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub avg_score: i32,
    pub count: usize,
    pub source_tag: String,
}

impl AggregateSentiment {
    pub fn empty() -> Self {
        Self {
            overall: SentimentLabel::Neutral,
            positive: 0,
            negative: 0,
            neutral: 0,
            avg_score: 0,
            count: 0,
            source_tag: TAG_NONE.to_string(),
        }
    }
}

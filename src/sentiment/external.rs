// src/sentiment/external.rs
// External sentiment API clients. A scorer returns `None` on any failure
// (network error, non-success status, malformed body) and the engine falls
// back to the local lexicon; nothing here ever raises to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::SentimentApiConfig;

const HUGGINGFACE_URL: &str = "https://api-inference.huggingface.co/models/ProsusAI/finbert";

/// Label-probability triple as returned by the external model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelProbabilities {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[async_trait]
pub trait ExternalScorer: Send + Sync {
    /// One attempt, no retry. `None` means "fall back to local scoring".
    async fn score(&self, text: &str) -> Option<LabelProbabilities>;
    /// Tag recorded on results this scorer produced.
    fn tag(&self) -> &str;
}

/// Build a scorer from configuration. Missing credential or an unknown
/// provider is "feature not configured" and yields `None`.
pub fn from_config(cfg: &SentimentApiConfig) -> Option<Arc<dyn ExternalScorer>> {
    if !cfg.is_configured() {
        return None;
    }
    let api_key = cfg.api_key.clone().unwrap_or_default();
    match cfg.provider.as_str() {
        "huggingface" => Some(Arc::new(HuggingFaceScorer::new(
            api_key,
            cfg.endpoint.clone(),
        ))),
        "custom" => match &cfg.endpoint {
            Some(url) => Some(Arc::new(CustomScorer::new(api_key, url.clone()))),
            None => {
                tracing::warn!("custom sentiment provider requires SENTIMENT_API_URL, using local scoring");
                None
            }
        },
        other => {
            tracing::warn!(provider = other, "unknown sentiment provider, using local scoring");
            None
        }
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("portfolio-news/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
}

/// Hugging Face Inference API running the FinBERT financial model.
pub struct HuggingFaceScorer {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl HuggingFaceScorer {
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        Self {
            http: http_client(),
            api_key,
            endpoint: endpoint.unwrap_or_else(|| HUGGINGFACE_URL.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[async_trait]
impl ExternalScorer for HuggingFaceScorer {
    async fn score(&self, text: &str) -> Option<LabelProbabilities> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| tracing::warn!(error = ?e, "sentiment api request failed"))
            .ok()?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "sentiment api non-success status");
            return None;
        }
        // FinBERT returns one row of labeled scores per input.
        let rows: Vec<Vec<LabelScore>> = resp.json().await.ok()?;
        let row = rows.first()?;

        let mut p = LabelProbabilities {
            positive: 0.0,
            negative: 0.0,
            neutral: 0.0,
        };
        for entry in row {
            match entry.label.to_ascii_lowercase().as_str() {
                "positive" => p.positive = entry.score,
                "negative" => p.negative = entry.score,
                "neutral" => p.neutral = entry.score,
                _ => {}
            }
        }
        Some(p)
    }

    fn tag(&self) -> &str {
        "huggingface-finbert"
    }
}

/// User-hosted endpoint accepting `{"text": ...}` and answering with a
/// `{"positive": .., "negative": .., "neutral": ..}` probability triple.
pub struct CustomScorer {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl CustomScorer {
    pub fn new(api_key: String, endpoint: String) -> Self {
        Self {
            http: http_client(),
            api_key,
            endpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomResponse {
    #[serde(default)]
    positive: f64,
    #[serde(default)]
    negative: f64,
    #[serde(default)]
    neutral: f64,
}

#[async_trait]
impl ExternalScorer for CustomScorer {
    async fn score(&self, text: &str) -> Option<LabelProbabilities> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| tracing::warn!(error = ?e, "sentiment api request failed"))
            .ok()?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "sentiment api non-success status");
            return None;
        }
        let body: CustomResponse = resp.json().await.ok()?;
        Some(LabelProbabilities {
            positive: body.positive,
            negative: body.negative,
            neutral: body.neutral,
        })
    }

    fn tag(&self) -> &str {
        "custom"
    }
}

// src/config.rs
// Environment-backed configuration. A missing credential is "feature not
// configured", never an error: the sentiment engine routes to the local
// lexicon and the Finnhub provider yields zero results.

use std::env;

#[derive(Debug, Clone)]
pub struct SentimentApiConfig {
    /// Credential for the external sentiment API. Absent -> local-only.
    pub api_key: Option<String>,
    /// "huggingface" (default) or "custom".
    pub provider: String,
    /// Endpoint override; required for the "custom" provider.
    pub endpoint: Option<String>,
}

impl Default for SentimentApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: "huggingface".to_string(),
            endpoint: None,
        }
    }
}

impl SentimentApiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sentiment: SentimentApiConfig,
    /// Enables the Finnhub company-news provider.
    pub finnhub_api_key: Option<String>,
    /// SEC EDGAR requires an organization-identifying User-Agent string.
    pub sec_user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sentiment: SentimentApiConfig::default(),
            finnhub_api_key: None,
            sec_user_agent: default_sec_user_agent(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            sentiment: SentimentApiConfig {
                api_key: non_empty_var("SENTIMENT_API_KEY"),
                provider: non_empty_var("SENTIMENT_API_PROVIDER")
                    .map(|p| p.to_ascii_lowercase())
                    .unwrap_or_else(|| "huggingface".to_string()),
                endpoint: non_empty_var("SENTIMENT_API_URL"),
            },
            finnhub_api_key: non_empty_var("FINNHUB_API_KEY"),
            sec_user_agent: non_empty_var("SEC_USER_AGENT")
                .unwrap_or_else(default_sec_user_agent),
        }
    }

    /// Load `.env` (best effort), then read the environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env()
    }
}

fn default_sec_user_agent() -> String {
    "portfolio-news/0.1 (contact@example.com)".to_string()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

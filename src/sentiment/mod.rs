// src/sentiment/mod.rs
//! Sentiment engine: tries the configured external model API once per text,
//! falls back to a deterministic local lexicon scorer on any failure or when
//! unconfigured. Title and summary are combined with fixed 60/40 weighting;
//! sets of articles aggregate under a looser ±15 threshold.

pub mod external;

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::config::SentimentApiConfig;
use crate::model::{
    AggregateSentiment, Article, SentimentLabel, SentimentResult, TAG_LOCAL, TAG_NONE,
};
use external::{ExternalScorer, LabelProbabilities};

/// Per-article and per-text label threshold.
const TEXT_THRESHOLD: i32 = 20;
/// Aggregate threshold, intentionally looser than the per-article one.
const AGGREGATE_THRESHOLD: i32 = 15;
/// Weight applied to the title score; the summary gets the remainder.
const TITLE_WEIGHT: f64 = 0.6;

#[derive(Deserialize)]
struct LexiconFile {
    positive: Vec<String>,
    negative: Vec<String>,
    intensifiers: Vec<String>,
    negators: Vec<String>,
}

struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    intensifiers: HashSet<String>,
    negators: HashSet<String>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("lexicon.json");
    let file: LexiconFile = serde_json::from_str(raw).expect("valid sentiment lexicon");
    Lexicon {
        positive: file.positive.into_iter().collect(),
        negative: file.negative.into_iter().collect(),
        intensifiers: file.intensifiers.into_iter().collect(),
        negators: file.negators.into_iter().collect(),
    }
});

#[derive(Debug, Clone, Copy)]
pub struct ScoreOptions {
    /// When false the external API is never attempted, even if configured.
    pub use_external: bool,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self { use_external: true }
    }
}

#[derive(Clone)]
pub struct SentimentEngine {
    external: Option<Arc<dyn ExternalScorer>>,
}

impl SentimentEngine {
    /// Local-only engine, no external API.
    pub fn new() -> Self {
        Self { external: None }
    }

    /// Build from configuration; an unconfigured credential silently yields
    /// a local-only engine.
    pub fn from_config(cfg: &SentimentApiConfig) -> Self {
        Self {
            external: external::from_config(cfg),
        }
    }

    pub fn with_external(scorer: Arc<dyn ExternalScorer>) -> Self {
        Self {
            external: Some(scorer),
        }
    }

    /// Score a single text. Never fails: the external path degrades to the
    /// local lexicon, and the local path cannot fail on string input.
    pub async fn score_text(&self, text: &str, opts: &ScoreOptions) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::none();
        }
        if opts.use_external {
            if let Some(ext) = &self.external {
                // Exactly one attempt; any failure falls through.
                if let Some(probs) = ext.score(text).await {
                    return from_probabilities(&probs, ext.tag());
                }
                tracing::debug!(tag = ext.tag(), "external scorer unavailable, using local lexicon");
            }
        }
        score_local(text)
    }

    /// Score title and summary independently, then combine 60/40. The label
    /// is recomputed from the combined score; the tag follows the title.
    pub async fn score_article(&self, article: &Article, opts: &ScoreOptions) -> SentimentResult {
        let title = self.score_text(&article.title, opts).await;
        let summary = self
            .score_text(article.summary.as_deref().unwrap_or(""), opts)
            .await;

        let score = weighted(title.score, summary.score);
        let confidence = weighted(title.confidence, summary.confidence);
        SentimentResult {
            score,
            label: SentimentLabel::from_score(score, TEXT_THRESHOLD),
            confidence,
            source_tag: title.source_tag,
        }
    }

    /// Score every article (order-insensitive, concurrently) and tally the
    /// labels. Empty input returns the all-zero neutral aggregate.
    pub async fn score_many(&self, articles: &[Article], opts: &ScoreOptions) -> AggregateSentiment {
        if articles.is_empty() {
            return AggregateSentiment::empty();
        }

        let results =
            futures::future::join_all(articles.iter().map(|a| self.score_article(a, opts))).await;

        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut neutral = 0usize;
        let mut total = 0i64;
        let mut source_tag = TAG_NONE.to_string();
        for r in &results {
            total += r.score as i64;
            match r.label {
                SentimentLabel::Positive => positive += 1,
                SentimentLabel::Negative => negative += 1,
                SentimentLabel::Neutral => neutral += 1,
            }
            source_tag = r.source_tag.clone();
        }

        let avg_score = (total as f64 / results.len() as f64).round() as i32;
        AggregateSentiment {
            overall: SentimentLabel::from_score(avg_score, AGGREGATE_THRESHOLD),
            positive,
            negative,
            neutral,
            avg_score,
            count: results.len(),
            source_tag,
        }
    }
}

impl Default for SentimentEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn weighted(title: i32, summary: i32) -> i32 {
    (title as f64 * TITLE_WEIGHT + summary as f64 * (1.0 - TITLE_WEIGHT)).round() as i32
}

/// Map an external label-probability triple into a result. The label is the
/// argmax with ties broken toward neutral.
fn from_probabilities(p: &LabelProbabilities, tag: &str) -> SentimentResult {
    let score = ((p.positive - p.negative) * 100.0).round() as i32;
    let label = if p.positive > p.negative && p.positive > p.neutral {
        SentimentLabel::Positive
    } else if p.negative > p.positive && p.negative > p.neutral {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    let confidence = (p.positive.max(p.negative).max(p.neutral) * 100.0).round() as i32;
    SentimentResult {
        score: score.clamp(-100, 100),
        label,
        confidence: confidence.clamp(0, 100),
        source_tag: tag.to_string(),
    }
}

/// Deterministic lexicon walk. Intensifiers set a pending 1.5 multiplier,
/// negators a pending sign flip; both are consumed by the next scored word.
fn score_local(text: &str) -> SentimentResult {
    let tokens = tokenize(text);
    let lex = &*LEXICON;

    let mut sum = 0.0f64;
    let mut matched = 0usize;
    let mut intensity = 1.0f64;
    let mut negated = false;

    for word in &tokens {
        if lex.intensifiers.contains(word) {
            intensity = 1.5;
            continue;
        }
        if lex.negators.contains(word) {
            negated = true;
            continue;
        }

        let mut word_score = if lex.positive.contains(word) {
            matched += 1;
            intensity
        } else if lex.negative.contains(word) {
            matched += 1;
            -intensity
        } else {
            0.0
        };

        if negated && word_score != 0.0 {
            word_score = -word_score;
            negated = false;
        }
        sum += word_score;
        if word_score != 0.0 {
            intensity = 1.0;
        }
    }

    let score = if matched > 0 {
        (((sum / matched as f64) * 100.0).round() as i32).clamp(-100, 100)
    } else {
        0
    };
    let confidence = if tokens.is_empty() {
        0
    } else {
        ((matched as f64 / tokens.len() as f64) * 100.0).min(100.0).round() as i32
    };

    SentimentResult {
        score,
        label: SentimentLabel::from_score(score, TEXT_THRESHOLD),
        confidence,
        source_tag: TAG_LOCAL.to_string(),
    }
}

/// Alphanumeric tokens, lower-cased; punctuation splits.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_loads_and_has_no_overlap() {
        let lex = &*LEXICON;
        assert!(lex.positive.contains("bullish"));
        assert!(lex.negative.contains("bearish"));
        assert!(lex.positive.is_disjoint(&lex.negative));
    }

    #[test]
    fn single_positive_word_scores_full() {
        let r = score_local("good");
        assert_eq!(r.score, 100);
        assert_eq!(r.label, SentimentLabel::Positive);
        assert_eq!(r.confidence, 100);
        assert_eq!(r.source_tag, TAG_LOCAL);
    }

    #[test]
    fn negation_flips_the_next_scored_word() {
        let plain = score_local("good");
        let negated = score_local("not good");
        assert!(plain.score > 0);
        assert!(negated.score <= 0);
    }

    #[test]
    fn intensifier_is_consumed_by_one_word() {
        // "very good" = +1.5 over one match, clamped to 100.
        let r = score_local("very good");
        assert_eq!(r.score, 100);
        // Intensity must reset: "very good bad" = (1.5 - 1.0) / 2 = 25.
        let r = score_local("very good bad");
        assert_eq!(r.score, 25);
        assert_eq!(r.label, SentimentLabel::Positive);
    }

    #[test]
    fn no_matches_yield_zero_with_low_confidence() {
        let r = score_local("the quick brown fox");
        assert_eq!(r.score, 0);
        assert_eq!(r.confidence, 0);
        assert_eq!(r.label, SentimentLabel::Neutral);
    }

    #[test]
    fn external_probabilities_map_to_score_and_argmax_label() {
        let r = from_probabilities(
            &LabelProbabilities {
                positive: 0.7,
                negative: 0.1,
                neutral: 0.2,
            },
            "huggingface-finbert",
        );
        assert_eq!(r.score, 60);
        assert_eq!(r.label, SentimentLabel::Positive);
        assert_eq!(r.confidence, 70);
        assert_eq!(r.source_tag, "huggingface-finbert");
    }

    #[test]
    fn probability_ties_break_toward_neutral() {
        let r = from_probabilities(
            &LabelProbabilities {
                positive: 0.4,
                negative: 0.4,
                neutral: 0.2,
            },
            "t",
        );
        assert_eq!(r.label, SentimentLabel::Neutral);
    }
}

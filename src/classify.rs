// src/classify.rs
// Coarse type/category tagging via keyword matching over the lowercased
// title + summary. Rules are evaluated in a fixed precedence order and only
// the first match applies; filings override everything else.

use crate::model::{Article, ArticleType, Category, NewsSource};

const FILING_KEYWORDS: &[&str] = &[
    "sec filing",
    "10-k",
    "10-q",
    "8-k",
    "form 4",
    "s-1",
    "13f",
    "prospectus",
    "proxy statement",
    "registration statement",
];

const EARNINGS_KEYWORDS: &[&str] = &[
    "earnings",
    "quarterly results",
    "quarterly report",
    "eps",
    "revenue",
    "profit report",
    "guidance",
    "beats estimates",
    "misses estimates",
];

const DIVIDEND_KEYWORDS: &[&str] = &["dividend", "payout", "ex-dividend", "distribution"];

const MERGER_KEYWORDS: &[&str] = &[
    "merger",
    "acquisition",
    "acquire",
    "acquires",
    "takeover",
    "buyout",
    "deal to buy",
];

const MARKET_KEYWORDS: &[&str] = &[
    "surge",
    "rally",
    "plunge",
    "slump",
    "record high",
    "sell-off",
    "selloff",
    "rebound",
    "tumble",
    "soar",
];

/// Derive `(type, category)` for an article. Pure: the article is not
/// mutated, callers assign the result.
pub fn classify(article: &Article) -> (ArticleType, Option<Category>) {
    let mut text = article.title.to_ascii_lowercase();
    if let Some(summary) = &article.summary {
        text.push(' ');
        text.push_str(&summary.to_ascii_lowercase());
    }

    let from_filings_feed =
        article.source == NewsSource::SecEdgar || article.article_type == ArticleType::Filing;
    if from_filings_feed || contains_any(&text, FILING_KEYWORDS) {
        return (ArticleType::Filing, Some(Category::Regulation));
    }
    if contains_any(&text, EARNINGS_KEYWORDS) {
        return (ArticleType::Earnings, Some(Category::Earnings));
    }
    if contains_any(&text, DIVIDEND_KEYWORDS) {
        return (ArticleType::Dividend, Some(Category::Dividends));
    }
    if contains_any(&text, MERGER_KEYWORDS) {
        return (ArticleType::Merger, Some(Category::Merger));
    }
    if contains_any(&text, MARKET_KEYWORDS) {
        return (ArticleType::Article, Some(Category::Market));
    }
    (ArticleType::Article, None)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SentimentHint;
    use chrono::Utc;

    fn article(source: NewsSource, title: &str, summary: &str) -> Article {
        Article {
            source,
            title: title.to_string(),
            summary: (!summary.is_empty()).then(|| summary.to_string()),
            url: "https://example.com/a".to_string(),
            published_at: Utc::now(),
            publisher: None,
            thumbnail_url: None,
            article_type: ArticleType::Article,
            category: None,
            sentiment: SentimentHint::Compute,
        }
    }

    #[test]
    fn filing_keywords_override_everything_else() {
        let a = article(
            NewsSource::Yahoo,
            "Company files 10-K with record earnings",
            "Annual dividend also announced",
        );
        assert_eq!(classify(&a), (ArticleType::Filing, Some(Category::Regulation)));
    }

    #[test]
    fn filings_provider_tag_forces_filing_type() {
        let a = article(NewsSource::SecEdgar, "Current report", "SEC Filing");
        assert_eq!(classify(&a), (ArticleType::Filing, Some(Category::Regulation)));
    }

    #[test]
    fn precedence_is_earnings_then_dividend_then_merger() {
        let a = article(NewsSource::Yahoo, "Q3 earnings beat, dividend raised", "");
        assert_eq!(classify(&a), (ArticleType::Earnings, Some(Category::Earnings)));

        let b = article(NewsSource::Yahoo, "Board approves special dividend", "");
        assert_eq!(classify(&b), (ArticleType::Dividend, Some(Category::Dividends)));

        let c = article(NewsSource::Finnhub, "Rival agrees to takeover bid", "");
        assert_eq!(classify(&c), (ArticleType::Merger, Some(Category::Merger)));
    }

    #[test]
    fn market_movement_sets_category_only() {
        let a = article(NewsSource::Yahoo, "Shares surge after upgrade", "");
        assert_eq!(classify(&a), (ArticleType::Article, Some(Category::Market)));
    }

    #[test]
    fn plain_story_stays_untagged() {
        let a = article(NewsSource::Yahoo, "CEO interviewed at conference", "");
        assert_eq!(classify(&a), (ArticleType::Article, None));
    }
}

//! Keyword heuristic.

use async_trait::async_trait;

use super::{ClassifierError, SentimentClassifier, SentimentVerdict};
use crate::data::NewsItem;

/// Headline terms that signal a catalyst.
pub const POSITIVE_KEYWORDS: &[&str] = &[
    "흑자전환",
    "실적개선",
    "사상최대",
    "호실적",
    "수주",
    "계약체결",
    "공급계약",
    "MOU",
    "신약",
    "임상",
    "FDA",
    "승인",
    "특허",
    "기술이전",
    "상용화",
    "외국인매수",
    "기관매수",
    "상한가",
];

/// Headline terms that veto a catalyst when two or more appear.
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "적자",
    "하락",
    "악재",
    "조사",
    "수사",
    "횡령",
    "배임",
    "상장폐지",
    "관리종목",
    "감사의견거절",
];

fn distinct_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}

/// Score headlines by keyword hits.
///
/// Each keyword counts once across all titles. Two or more negative hits
/// force a zero regardless of positive hits.
pub fn keyword_verdict(news: &[NewsItem]) -> SentimentVerdict {
    if news.is_empty() {
        return SentimentVerdict::new(0, "no news");
    }

    let text = news
        .iter()
        .map(|n| n.title.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let positive = distinct_hits(&text, POSITIVE_KEYWORDS);
    let negative = distinct_hits(&text, NEGATIVE_KEYWORDS);

    if negative >= 2 {
        return SentimentVerdict::new(0, format!("negative keywords ({})", negative));
    }

    let score = match positive {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    };
    let reason = if score == 0 {
        "no catalyst keywords".to_string()
    } else {
        format!("positive keywords ({})", positive)
    };

    SentimentVerdict::new(score, reason)
}

/// Local heuristic classifier; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

#[async_trait]
impl SentimentClassifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keywords"
    }

    async fn classify(
        &self,
        _stock_name: &str,
        news: &[NewsItem],
    ) -> Result<SentimentVerdict, ClassifierError> {
        Ok(keyword_verdict(news))
    }
}

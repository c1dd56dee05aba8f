//! Floors for failed collaborator calls.
//!
//! A failed fetch is never fatal: it degrades to the value that scores the
//! affected factor at zero, or to an empty market.
//!
//! | call          | on error                 |
//! |---------------|--------------------------|
//! | top gainers   | market skipped           |
//! | chart data    | no bars                  |
//! | supply data   | all flows zero           |
//! | news          | no headlines             |
//! | classifier    | keyword heuristic        |

use tracing::warn;

use crate::data::{Bar, CandidateStock, NewsItem, ProviderError, SupplyData};
use crate::sentiment::{keyword_verdict, ClassifierError, SentimentVerdict};

pub fn candidates_or_empty(
    result: Result<Vec<CandidateStock>, ProviderError>,
    market: &str,
) -> Vec<CandidateStock> {
    result.unwrap_or_else(|e| {
        warn!(
            market = %market,
            error = %e,
            recoverable = e.is_recoverable(),
            "Candidate list fetch failed, skipping market"
        );
        Vec::new()
    })
}

pub fn bars_or_empty(result: Result<Vec<Bar>, ProviderError>, code: &str) -> Vec<Bar> {
    result.unwrap_or_else(|e| {
        warn!(code = %code, error = %e, "Chart fetch failed, scoring without bars");
        Vec::new()
    })
}

pub fn supply_or_zero(result: Result<SupplyData, ProviderError>, code: &str) -> SupplyData {
    result.unwrap_or_else(|e| {
        warn!(code = %code, error = %e, "Supply fetch failed, using zero flows");
        SupplyData::default()
    })
}

pub fn news_or_empty(result: Result<Vec<NewsItem>, ProviderError>, code: &str) -> Vec<NewsItem> {
    result.unwrap_or_else(|e| {
        warn!(code = %code, error = %e, "News fetch failed, continuing without news");
        Vec::new()
    })
}

/// Clamp a classifier verdict, or fall back to the keyword heuristic.
pub fn verdict_or_keywords(
    result: Result<SentimentVerdict, ClassifierError>,
    news: &[NewsItem],
    code: &str,
) -> SentimentVerdict {
    match result {
        Ok(verdict) => verdict.clamped(),
        Err(e) => {
            warn!(code = %code, error = %e, "Classifier failed, using keyword heuristic");
            keyword_verdict(news)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::DEFAULT_REASON;

    #[test]
    fn test_provider_errors_map_to_floors() {
        let err = || ProviderError::Network("timeout".into());
        assert!(bars_or_empty(Err(err()), "000001").is_empty());
        assert_eq!(supply_or_zero(Err(err()), "000001"), SupplyData::default());
        assert!(news_or_empty(Err(err()), "000001").is_empty());
        assert!(candidates_or_empty(Err(err()), "KOSDAQ").is_empty());
        assert!(candidates_or_empty(
            Err(ProviderError::DataNotAvailable("KONEX".into())),
            "KONEX"
        )
        .is_empty());
    }

    #[test]
    fn test_success_passes_through() {
        let supply = SupplyData {
            foreign_5d: 3,
            ..SupplyData::default()
        };
        assert_eq!(supply_or_zero(Ok(supply), "000001"), supply);

        let news = vec![NewsItem::new("수주", "finance")];
        assert_eq!(news_or_empty(Ok(news.clone()), "000001"), news);
    }

    #[test]
    fn test_classifier_error_uses_keywords() {
        let news = vec![NewsItem::new("FDA 승인", "finance")];
        let verdict = verdict_or_keywords(Err(ClassifierError::EmptyResponse), &news, "000001");
        assert_eq!(verdict.score, 2);

        let verdict = verdict_or_keywords(Err(ClassifierError::EmptyResponse), &[], "000001");
        assert_eq!(verdict.score, 0);
    }

    #[test]
    fn test_classifier_verdict_is_clamped() {
        let raw = SentimentVerdict {
            score: 8,
            reason: String::new(),
        };
        let verdict = verdict_or_keywords(Ok(raw), &[], "000001");
        assert_eq!(verdict.score, 3);
        assert_eq!(verdict.reason, DEFAULT_REASON);
    }
}

//! News sentiment classification.
//!
//! The classifier turns a candidate's headlines into a 0..=3 score with a
//! short rationale. A remote model ([`GeminiClassifier`]) is used when an
//! API key is configured; [`KeywordClassifier`] is the deterministic local
//! heuristic and the fallback whenever the remote call fails.

mod keywords;
mod llm;

pub use keywords::{keyword_verdict, KeywordClassifier, NEGATIVE_KEYWORDS, POSITIVE_KEYWORDS};
pub use llm::{parse_verdict, GeminiClassifier};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::NewsItem;

/// Rationale used when a classifier returns a score without one.
pub const DEFAULT_REASON: &str = "analysis complete";

// ============================================================================
// Verdict
// ============================================================================

/// Sentiment score and rationale for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub score: u8,
    pub reason: String,
}

impl SentimentVerdict {
    pub const MAX_SCORE: u8 = 3;

    /// Build a verdict from a raw score, clamping it into `0..=3`.
    pub fn new(score: i64, reason: impl Into<String>) -> Self {
        Self {
            score: score.clamp(0, i64::from(Self::MAX_SCORE)) as u8,
            reason: reason.into(),
        }
        .clamped()
    }

    /// Clamp the score and default an empty rationale.
    pub fn clamped(mut self) -> Self {
        self.score = self.score.min(Self::MAX_SCORE);
        if self.reason.trim().is_empty() {
            self.reason = DEFAULT_REASON.to_string();
        }
        self
    }
}

// ============================================================================
// Classifier Error
// ============================================================================

/// Why a classifier could not produce a verdict.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Empty response from classifier")]
    EmptyResponse,
}

// ============================================================================
// Classifier Trait
// ============================================================================

/// Scores a candidate's headlines.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Get the classifier name for logging.
    fn name(&self) -> &'static str;

    /// Classify `news` about `stock_name`.
    async fn classify(
        &self,
        stock_name: &str,
        news: &[NewsItem],
    ) -> Result<SentimentVerdict, ClassifierError>;
}

//! Collaborator traits for market data and news.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::{Bar, CandidateStock, NewsItem, SupplyData};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors that can occur when fetching data from a provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Data not available for the requested code or market
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    /// Provider is temporarily unavailable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Check if the error is transient (a later call may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Unavailable(_))
    }
}

// ============================================================================
// Market Data Provider
// ============================================================================

/// Source of candidate lists, daily bars and investor flows.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// Ranked, pre-filtered candidates for one market on `date`.
    ///
    /// Implementations apply the value/price/change bounds and the exclusion
    /// keywords before returning (see [`super::UniverseFilter`]).
    async fn top_gainers(
        &self,
        market: &str,
        count: usize,
        date: NaiveDate,
    ) -> Result<Vec<CandidateStock>, ProviderError>;

    /// Daily bars for `code`, oldest first. May be empty.
    async fn chart_data(&self, code: &str, days: usize) -> Result<Vec<Bar>, ProviderError>;

    /// Net buying aggregates for `code`.
    async fn supply_data(&self, code: &str, days: usize) -> Result<SupplyData, ProviderError>;
}

// ============================================================================
// News Provider
// ============================================================================

/// Best-effort source of headlines for a candidate.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Get the provider name for logging.
    fn name(&self) -> &'static str;

    /// At most `max_items` headlines about `name` / `code`, newest first.
    async fn collect_news(
        &self,
        name: &str,
        code: &str,
        max_items: usize,
    ) -> Result<Vec<NewsItem>, ProviderError>;
}

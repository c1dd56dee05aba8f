//! Market data types and collaborator boundaries.
//!
//! The screener never talks to an exchange directly. Everything it needs
//! (candidate lists, daily bars, investor flows, headlines) comes through the
//! [`MarketDataProvider`] and [`NewsProvider`] traits, and every call returns
//! a `Result` so the orchestrator can decide what a failure means.

mod news;
mod provider;
mod rate_limiter;
mod snapshot;
mod universe;

pub use news::CompositeNewsProvider;
pub use provider::{MarketDataProvider, NewsProvider, ProviderError};
pub use rate_limiter::{CallThrottle, Clock, TokioClock};
pub use snapshot::{MarketSnapshot, SnapshotProvider};
pub use universe::{MarketRow, UniverseFilter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Bar
// ============================================================================

/// One daily OHLCV bar. Sequences are ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Closed above the open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Absolute distance between open and close.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Distance from the top of the body to the high.
    pub fn upper_wick(&self) -> f64 {
        self.high - self.close.max(self.open)
    }
}

// ============================================================================
// Supply Data
// ============================================================================

/// Foreign and institutional net buying, summed over 5 and 20 sessions.
///
/// The zero value is what a failed fetch maps to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyData {
    #[serde(default)]
    pub foreign_5d: i64,
    #[serde(default)]
    pub inst_5d: i64,
    #[serde(default)]
    pub foreign_20d: i64,
    #[serde(default)]
    pub inst_20d: i64,
}

impl SupplyData {
    /// Both foreigners and institutions were net buyers over 5 sessions.
    pub fn both_buying(&self) -> bool {
        self.foreign_5d > 0 && self.inst_5d > 0
    }
}

// ============================================================================
// News Item
// ============================================================================

/// A headline attached to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    /// Free-form publication date as reported by the source
    #[serde(default)]
    pub published_at: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            url: String::new(),
            published_at: String::new(),
        }
    }
}

// ============================================================================
// Candidate Stock
// ============================================================================

/// A stock that passed the universe filter for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateStock {
    pub code: String,
    pub name: String,
    pub market: String,
    #[serde(default)]
    pub sector: String,
    pub current_price: i64,
    pub change_pct: f64,
    pub trading_value: u64,
    #[serde(default)]
    pub foreign_5d: i64,
    #[serde(default)]
    pub inst_5d: i64,
    #[serde(default)]
    pub foreign_20d: i64,
    #[serde(default)]
    pub inst_20d: i64,
}

impl CandidateStock {
    /// Overwrite the flow aggregates with freshly fetched supply data.
    pub fn apply_supply(&mut self, supply: &SupplyData) {
        self.foreign_5d = supply.foreign_5d;
        self.inst_5d = supply.inst_5d;
        self.foreign_20d = supply.foreign_20d;
        self.inst_20d = supply.inst_20d;
    }

    /// Current flow aggregates as a [`SupplyData`].
    pub fn supply(&self) -> SupplyData {
        SupplyData {
            foreign_5d: self.foreign_5d,
            inst_5d: self.inst_5d,
            foreign_20d: self.foreign_20d,
            inst_20d: self.inst_20d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            open,
            high,
            low: open.min(close),
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn test_bar_geometry() {
        let b = bar(100.0, 112.0, 110.0);
        assert!(b.is_bullish());
        assert_eq!(b.body(), 10.0);
        assert_eq!(b.upper_wick(), 2.0);

        let bearish = bar(110.0, 115.0, 100.0);
        assert!(!bearish.is_bullish());
        assert_eq!(bearish.upper_wick(), 5.0);
    }

    #[test]
    fn test_apply_supply_overwrites_flows() {
        let mut stock = CandidateStock {
            code: "005930".into(),
            name: "삼성전자".into(),
            market: "KOSPI".into(),
            sector: String::new(),
            current_price: 70_000,
            change_pct: 6.1,
            trading_value: 900_000_000_000,
            foreign_5d: 99,
            inst_5d: 99,
            foreign_20d: 99,
            inst_20d: 99,
        };

        stock.apply_supply(&SupplyData::default());
        assert_eq!(stock.supply(), SupplyData::default());

        let flows = SupplyData {
            foreign_5d: 10,
            inst_5d: -3,
            foreign_20d: 40,
            inst_20d: 2,
        };
        stock.apply_supply(&flows);
        assert_eq!(stock.supply(), flows);
        assert!(!stock.supply().both_buying());
    }

    #[test]
    fn test_candidate_deserializes_without_flows() {
        let json = r#"{
            "code": "035720",
            "name": "카카오",
            "market": "KOSPI",
            "current_price": 41000,
            "change_pct": 7.5,
            "trading_value": 120000000000
        }"#;
        let stock: CandidateStock = serde_json::from_str(json).unwrap();
        assert_eq!(stock.supply(), SupplyData::default());
        assert!(stock.sector.is_empty());
    }
}

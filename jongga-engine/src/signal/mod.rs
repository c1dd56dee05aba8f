//! Signal data model.
//!
//! A [`Signal`] is the screener's unit of output: the enriched candidate, how
//! it scored, its grade and a sized position plan. [`SignalRecord`] is the
//! same data flattened into one row for serialization.

mod grade;

pub use grade::{Grade, UnknownGrade};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::{CandidateStock, NewsItem};

// ============================================================================
// Score Breakdown
// ============================================================================

/// Six capped sub-scores plus the sentiment rationale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// News sentiment, 0..=3
    pub news: u8,
    /// Trading value tier, 0..=3
    pub volume: u8,
    /// Trend stacking and proximity to the 20-day high, 0..=2
    pub chart: u8,
    /// Strong-close candle, 0..=1
    pub candle: u8,
    /// Volatility contraction, 0..=1
    pub consolidation: u8,
    /// Foreign and institutional buying, 0..=2
    pub supply: u8,
    /// Rationale from the sentiment classifier
    #[serde(default)]
    pub rationale: String,
}

impl ScoreBreakdown {
    pub const MAX_NEWS: u8 = 3;
    pub const MAX_VOLUME: u8 = 3;
    pub const MAX_CHART: u8 = 2;
    pub const MAX_CANDLE: u8 = 1;
    pub const MAX_CONSOLIDATION: u8 = 1;
    pub const MAX_SUPPLY: u8 = 2;
    pub const MAX_TOTAL: u8 = Self::MAX_NEWS
        + Self::MAX_VOLUME
        + Self::MAX_CHART
        + Self::MAX_CANDLE
        + Self::MAX_CONSOLIDATION
        + Self::MAX_SUPPLY;

    /// Sum of the sub-scores.
    pub fn total(&self) -> u8 {
        self.news + self.volume + self.chart + self.candle + self.consolidation + self.supply
    }
}

// ============================================================================
// Checklist
// ============================================================================

/// Informational flags shown next to a signal. Not used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub has_news: bool,
    /// Distinct, non-empty news sources, sorted
    pub news_sources: Vec<String>,
    pub is_new_high: bool,
    pub is_breakout: bool,
    pub supply_positive: bool,
    pub volume_surge: bool,
}

// ============================================================================
// Position Plan
// ============================================================================

/// Price levels and risk-bounded size for one signal.
///
/// `risk_amount == share_count * risk_per_unit` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPlan {
    pub entry_price: i64,
    pub stop_price: i64,
    pub target_price: i64,
    pub share_count: u64,
    pub total_notional: i64,
    pub risk_per_unit: i64,
    pub risk_amount: i64,
    /// Capital at risk per trade
    pub r_value: f64,
    pub grade_multiplier: f64,
}

// ============================================================================
// Signal Status
// ============================================================================

/// Lifecycle of a signal. Only `Open` is set here; exits are recorded by
/// whatever tracks positions afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    #[default]
    Open,
    TargetHit,
    StopHit,
    TimeExit,
    GapExit,
}

impl SignalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

// ============================================================================
// Signal
// ============================================================================

/// A graded, sized recommendation for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub stock: CandidateStock,
    pub grade: Grade,
    pub score: ScoreBreakdown,
    pub checklist: Checklist,
    pub position: PositionPlan,
    pub news_items: Vec<NewsItem>,
    pub signal_date: NaiveDate,
    pub status: SignalStatus,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    /// Assemble a new open signal.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stock: CandidateStock,
        grade: Grade,
        score: ScoreBreakdown,
        checklist: Checklist,
        position: PositionPlan,
        news_items: Vec<NewsItem>,
        signal_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            stock,
            grade,
            score,
            checklist,
            position,
            news_items,
            signal_date,
            status: SignalStatus::Open,
            created_at: Utc::now(),
        }
    }

    pub fn total_score(&self) -> u8 {
        self.score.total()
    }

    /// Flatten into a [`SignalRecord`].
    pub fn to_record(&self) -> SignalRecord {
        SignalRecord::from(self)
    }
}

// ============================================================================
// Signal Record
// ============================================================================

/// One signal as a flat row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub id: String,
    pub signal_date: NaiveDate,
    pub status: SignalStatus,
    pub created_at: DateTime<Utc>,

    pub code: String,
    pub name: String,
    pub market: String,
    pub sector: String,
    pub current_price: i64,
    pub change_pct: f64,
    pub trading_value: u64,
    pub foreign_5d: i64,
    pub inst_5d: i64,
    pub foreign_20d: i64,
    pub inst_20d: i64,

    pub grade: Grade,
    pub total_score: u8,
    pub score_news: u8,
    pub score_volume: u8,
    pub score_chart: u8,
    pub score_candle: u8,
    pub score_consolidation: u8,
    pub score_supply: u8,
    pub rationale: String,

    pub has_news: bool,
    pub news_sources: Vec<String>,
    pub is_new_high: bool,
    pub is_breakout: bool,
    pub supply_positive: bool,
    pub volume_surge: bool,

    pub entry_price: i64,
    pub stop_price: i64,
    pub target_price: i64,
    pub share_count: u64,
    pub total_notional: i64,
    pub risk_per_unit: i64,
    pub risk_amount: i64,
    pub r_value: f64,
    pub grade_multiplier: f64,

    pub news_items: Vec<NewsItem>,
}

impl From<&Signal> for SignalRecord {
    fn from(s: &Signal) -> Self {
        Self {
            id: s.id.clone(),
            signal_date: s.signal_date,
            status: s.status,
            created_at: s.created_at,

            code: s.stock.code.clone(),
            name: s.stock.name.clone(),
            market: s.stock.market.clone(),
            sector: s.stock.sector.clone(),
            current_price: s.stock.current_price,
            change_pct: s.stock.change_pct,
            trading_value: s.stock.trading_value,
            foreign_5d: s.stock.foreign_5d,
            inst_5d: s.stock.inst_5d,
            foreign_20d: s.stock.foreign_20d,
            inst_20d: s.stock.inst_20d,

            grade: s.grade,
            total_score: s.score.total(),
            score_news: s.score.news,
            score_volume: s.score.volume,
            score_chart: s.score.chart,
            score_candle: s.score.candle,
            score_consolidation: s.score.consolidation,
            score_supply: s.score.supply,
            rationale: s.score.rationale.clone(),

            has_news: s.checklist.has_news,
            news_sources: s.checklist.news_sources.clone(),
            is_new_high: s.checklist.is_new_high,
            is_breakout: s.checklist.is_breakout,
            supply_positive: s.checklist.supply_positive,
            volume_surge: s.checklist.volume_surge,

            entry_price: s.position.entry_price,
            stop_price: s.position.stop_price,
            target_price: s.position.target_price,
            share_count: s.position.share_count,
            total_notional: s.position.total_notional,
            risk_per_unit: s.position.risk_per_unit,
            risk_amount: s.position.risk_amount,
            r_value: s.position.r_value,
            grade_multiplier: s.position.grade_multiplier,

            news_items: s.news_items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_signal() -> Signal {
        let stock = CandidateStock {
            code: "000660".into(),
            name: "SK하이닉스".into(),
            market: "KOSPI".into(),
            sector: "반도체".into(),
            current_price: 10_000,
            change_pct: 9.2,
            trading_value: 1_200_000_000_000,
            foreign_5d: 1_000,
            inst_5d: 500,
            foreign_20d: 0,
            inst_20d: 0,
        };
        let score = ScoreBreakdown {
            news: 3,
            volume: 3,
            chart: 2,
            candle: 1,
            consolidation: 0,
            supply: 2,
            rationale: "수주 공시".into(),
        };
        let position = PositionPlan {
            entry_price: 10_000,
            stop_price: 9_700,
            target_price: 10_500,
            share_count: 1_666,
            total_notional: 16_660_000,
            risk_per_unit: 300,
            risk_amount: 499_800,
            r_value: 250_000.0,
            grade_multiplier: 2.0,
        };
        Signal::new(
            stock,
            Grade::S,
            score,
            Checklist::default(),
            position,
            vec![NewsItem::new("수주 공시", "finance")],
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        )
    }

    #[test]
    fn test_max_total() {
        assert_eq!(ScoreBreakdown::MAX_TOTAL, 12);
        let full = ScoreBreakdown {
            news: 3,
            volume: 3,
            chart: 2,
            candle: 1,
            consolidation: 1,
            supply: 2,
            rationale: String::new(),
        };
        assert_eq!(full.total(), ScoreBreakdown::MAX_TOTAL);
    }

    #[test]
    fn test_new_signal_is_open() {
        let signal = sample_signal();
        assert_eq!(signal.status, SignalStatus::Open);
        assert!(!signal.status.is_terminal());
        assert!(SignalStatus::GapExit.is_terminal());
        assert_eq!(signal.total_score(), 11);
        assert!(Uuid::parse_str(&signal.id).is_ok());
    }

    #[test]
    fn test_record_flattens_everything() {
        let signal = sample_signal();
        let record = signal.to_record();

        assert_eq!(record.code, "000660");
        assert_eq!(record.total_score, 11);
        assert_eq!(record.score_supply, 2);
        assert_eq!(record.share_count, 1_666);
        assert_eq!(record.risk_amount, record.share_count as i64 * record.risk_per_unit);
        assert_eq!(record.news_items.len(), 1);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "OPEN");
        assert_eq!(json["grade"], "S");
        assert!(json.get("stock").is_none());
    }
}

//! Run summary and result envelope.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::signal::{Grade, Signal, SignalRecord};

// ============================================================================
// Run Summary
// ============================================================================

/// Read-only statistics over a run's signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    /// Counts for S, A and B; always contains all three
    pub by_grade: BTreeMap<Grade, usize>,
    pub by_market: BTreeMap<String, usize>,
    pub avg_score: f64,
    pub processing_time_ms: u64,
}

impl RunSummary {
    pub fn from_signals(signals: &[Signal], processing_time_ms: u64) -> Self {
        let mut by_grade: BTreeMap<Grade, usize> =
            [Grade::S, Grade::A, Grade::B].into_iter().map(|g| (g, 0)).collect();
        let mut by_market = BTreeMap::new();

        for signal in signals {
            *by_grade.entry(signal.grade).or_insert(0) += 1;
            *by_market.entry(signal.stock.market.clone()).or_insert(0) += 1;
        }

        let avg_score = if signals.is_empty() {
            0.0
        } else {
            let sum: u32 = signals.iter().map(|s| u32::from(s.total_score())).sum();
            f64::from(sum) / signals.len() as f64
        };

        Self {
            total: signals.len(),
            by_grade,
            by_market,
            avg_score,
            processing_time_ms,
        }
    }

    pub fn grade_count(&self, grade: Grade) -> usize {
        self.by_grade.get(&grade).copied().unwrap_or(0)
    }
}

// ============================================================================
// Screener Result
// ============================================================================

/// Output of one screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerResult {
    pub date: NaiveDate,
    /// Candidates that went through analysis
    pub total_candidates: usize,
    /// Signals kept after grading and truncation
    pub filtered_count: usize,
    pub signals: Vec<Signal>,
    pub summary: RunSummary,
    pub processing_time_ms: u64,
    pub updated_at: DateTime<Utc>,
}

impl ScreenerResult {
    pub fn new(
        date: NaiveDate,
        total_candidates: usize,
        signals: Vec<Signal>,
        processing_time_ms: u64,
    ) -> Self {
        let summary = RunSummary::from_signals(&signals, processing_time_ms);
        Self {
            date,
            total_candidates,
            filtered_count: signals.len(),
            signals,
            summary,
            processing_time_ms,
            updated_at: Utc::now(),
        }
    }

    /// Signals as flat records, in ranked order.
    pub fn records(&self) -> Vec<SignalRecord> {
        self.signals.iter().map(SignalRecord::from).collect()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} candidates -> {} signals (S {}, A {}, B {}), avg score {:.1}, {} ms",
            self.date,
            self.total_candidates,
            self.filtered_count,
            self.summary.grade_count(Grade::S),
            self.summary.grade_count(Grade::A),
            self.summary.grade_count(Grade::B),
            self.summary.avg_score,
            self.processing_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CandidateStock;
    use crate::signal::{Checklist, PositionPlan, ScoreBreakdown};

    fn signal(market: &str, grade: Grade, news: u8) -> Signal {
        let stock = CandidateStock {
            code: "000001".into(),
            name: "테스트".into(),
            market: market.into(),
            sector: String::new(),
            current_price: 10_000,
            change_pct: 8.0,
            trading_value: 600_000_000_000,
            foreign_5d: 0,
            inst_5d: 0,
            foreign_20d: 0,
            inst_20d: 0,
        };
        let score = ScoreBreakdown {
            news,
            volume: 3,
            chart: 2,
            ..ScoreBreakdown::default()
        };
        let position = PositionPlan {
            entry_price: 10_000,
            stop_price: 9_700,
            target_price: 10_500,
            share_count: 0,
            total_notional: 0,
            risk_per_unit: 300,
            risk_amount: 0,
            r_value: 250_000.0,
            grade_multiplier: 1.0,
        };
        Signal::new(
            stock,
            grade,
            score,
            Checklist::default(),
            position,
            vec![],
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        )
    }

    #[test]
    fn test_summary_counts() {
        let signals = vec![
            signal("KOSPI", Grade::A, 3),
            signal("KOSDAQ", Grade::B, 1),
            signal("KOSPI", Grade::B, 1),
        ];
        let summary = RunSummary::from_signals(&signals, 1_250);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.grade_count(Grade::S), 0);
        assert_eq!(summary.grade_count(Grade::A), 1);
        assert_eq!(summary.grade_count(Grade::B), 2);
        assert_eq!(summary.by_market["KOSPI"], 2);
        assert_eq!(summary.by_market["KOSDAQ"], 1);
        // totals 8, 6, 6
        assert!((summary.avg_score - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::from_signals(&[], 5);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_score, 0.0);
        assert_eq!(summary.by_grade.len(), 3);
        assert!(summary.by_market.is_empty());
    }

    #[test]
    fn test_result_envelope() {
        let result = ScreenerResult::new(
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            12,
            vec![signal("KOSPI", Grade::A, 3)],
            900,
        );
        assert_eq!(result.filtered_count, 1);
        assert_eq!(result.records().len(), 1);
        assert!(result.summary().starts_with("2026-10-16: 12 candidates -> 1 signals"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["summary"]["by_grade"]["A"], 1);
        assert_eq!(json["total_candidates"], 12);
    }
}

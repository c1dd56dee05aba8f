//! Score engine.
//!
//! Maps one candidate's inputs to six capped sub-scores and a checklist,
//! then to a grade:
//!
//! ```text
//! news           0..=3   external sentiment score
//! volume         0..=3   trading value tiers (1e11 / 5e11 / 1e12)
//! chart          0..=2   EMA5 > EMA20 > EMA60, close near 20-day high
//! candle         0..=1   bullish close with a short upper wick
//! consolidation  0..=1   volatility width contracting
//! supply         0..=2   foreign / institutional 5-day buying
//! ```
//!
//! Every rule is a pure function of its inputs. Missing data (no bars, no
//! news, zero flows) scores the affected factor at zero.

use std::collections::BTreeSet;

use crate::data::{Bar, NewsItem, SupplyData};
use crate::signal::{Checklist, Grade, ScoreBreakdown};

use super::indicators::{ewm_last, mean_defined, rolling_width, trailing_max, trailing_mean};

// ============================================================================
// Thresholds
// ============================================================================

const TRADING_VALUE_HIGH: u64 = 1_000_000_000_000;
const TRADING_VALUE_MID: u64 = 500_000_000_000;
const TRADING_VALUE_LOW: u64 = 100_000_000_000;

const MIN_BARS: usize = 20;
const MIN_BARS_BREAKOUT: usize = 5;
const HIGH_LOOKBACK: usize = 20;
const NEAR_HIGH_RATIO: f64 = 0.98;
const BREAKOUT_VOLUME_MULTIPLE: f64 = 2.0;

const EMA_FAST: usize = 5;
const EMA_MID: usize = 20;
const EMA_SLOW: usize = 60;

const MAX_UPPER_WICK_RATIO: f64 = 0.3;

const WIDTH_WINDOW: usize = 20;
const RECENT_WIDTH_BARS: usize = 5;
const CONTRACTION_RATIO: f64 = 0.7;

// ============================================================================
// Inputs
// ============================================================================

/// Everything the engine needs for one candidate.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub trading_value: u64,
    /// Carried for reporting; no rule reads it
    pub change_pct: f64,
    /// Daily bars, oldest first
    pub bars: &'a [Bar],
    pub news: &'a [NewsItem],
    /// Sentiment score from the classifier (or keyword fallback)
    pub sentiment_score: u8,
    pub sentiment_reason: &'a str,
    pub supply: &'a SupplyData,
}

// ============================================================================
// Score Engine
// ============================================================================

/// Stateless scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEngine;

impl ScoreEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score one candidate and derive its checklist.
    pub fn calculate(&self, inputs: &ScoreInputs<'_>) -> (ScoreBreakdown, Checklist) {
        let score = ScoreBreakdown {
            news: inputs.sentiment_score.min(ScoreBreakdown::MAX_NEWS),
            volume: Self::volume_score(inputs.trading_value),
            chart: Self::chart_score(inputs.bars),
            candle: Self::candle_score(inputs.bars),
            consolidation: Self::consolidation_score(inputs.bars),
            supply: Self::supply_score(inputs.supply),
            rationale: inputs.sentiment_reason.to_string(),
        };

        let news_sources: Vec<String> = inputs
            .news
            .iter()
            .map(|n| n.source.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let checklist = Checklist {
            has_news: !inputs.news.is_empty(),
            news_sources,
            is_new_high: Self::is_new_high(inputs.bars),
            is_breakout: Self::is_breakout(inputs.bars),
            supply_positive: inputs.supply.both_buying(),
            volume_surge: inputs.trading_value >= TRADING_VALUE_MID,
        };

        (score, checklist)
    }

    /// Grade from total score and trading value; first match wins.
    ///
    /// `change_pct` is not read by any threshold.
    pub fn determine_grade(
        &self,
        score: &ScoreBreakdown,
        trading_value: u64,
        _change_pct: f64,
    ) -> Grade {
        let total = score.total();

        if total >= 10 && trading_value >= TRADING_VALUE_HIGH {
            Grade::S
        } else if total >= 8 && trading_value >= TRADING_VALUE_MID {
            Grade::A
        } else if total >= 6 && trading_value >= TRADING_VALUE_LOW {
            Grade::B
        } else {
            Grade::C
        }
    }

    // ------------------------------------------------------------------------
    // Sub-scores
    // ------------------------------------------------------------------------

    pub fn volume_score(trading_value: u64) -> u8 {
        if trading_value >= TRADING_VALUE_HIGH {
            3
        } else if trading_value >= TRADING_VALUE_MID {
            2
        } else if trading_value >= TRADING_VALUE_LOW {
            1
        } else {
            0
        }
    }

    pub fn chart_score(bars: &[Bar]) -> u8 {
        if bars.len() < MIN_BARS {
            return 0;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut score = 0;

        let fast = ewm_last(&closes, EMA_FAST);
        let mid = ewm_last(&closes, EMA_MID);
        // Short histories compare against EMA20 itself, so the strict check fails.
        let slow = if closes.len() >= EMA_SLOW {
            ewm_last(&closes, EMA_SLOW)
        } else {
            mid
        };
        if let (Some(fast), Some(mid), Some(slow)) = (fast, mid, slow) {
            if fast > mid && mid > slow {
                score += 1;
            }
        }

        if Self::near_high(bars) {
            score += 1;
        }

        score.min(ScoreBreakdown::MAX_CHART)
    }

    pub fn candle_score(bars: &[Bar]) -> u8 {
        let Some(last) = bars.last() else {
            return 0;
        };

        let body = last.body();
        if !last.is_bullish() || body <= 0.0 {
            return 0;
        }

        u8::from(last.upper_wick() / body < MAX_UPPER_WICK_RATIO)
    }

    pub fn consolidation_score(bars: &[Bar]) -> u8 {
        if bars.len() < MIN_BARS {
            return 0;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let widths = rolling_width(&closes, WIDTH_WINDOW);
        let n = widths.len();

        let recent = mean_defined(&widths[n - RECENT_WIDTH_BARS..]);
        let prior = mean_defined(&widths[n - MIN_BARS..n - RECENT_WIDTH_BARS]);

        match (recent, prior) {
            (Some(recent), Some(prior)) if prior > 0.0 && recent < prior * CONTRACTION_RATIO => 1,
            _ => 0,
        }
    }

    pub fn supply_score(supply: &SupplyData) -> u8 {
        let score = u8::from(supply.foreign_5d > 0) + u8::from(supply.inst_5d > 0);
        score.min(ScoreBreakdown::MAX_SUPPLY)
    }

    // ------------------------------------------------------------------------
    // Checklist flags
    // ------------------------------------------------------------------------

    /// Latest close within 2% of the 20-bar high. Needs 20 bars.
    pub fn is_new_high(bars: &[Bar]) -> bool {
        bars.len() >= MIN_BARS && Self::near_high(bars)
    }

    /// Today's volume at least twice the 20-bar average. Needs 5 bars.
    pub fn is_breakout(bars: &[Bar]) -> bool {
        if bars.len() < MIN_BARS_BREAKOUT {
            return false;
        }

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        match (volumes.last(), trailing_mean(&volumes, HIGH_LOOKBACK)) {
            (Some(&today), Some(avg)) => today >= avg * BREAKOUT_VOLUME_MULTIPLE,
            _ => false,
        }
    }

    fn near_high(bars: &[Bar]) -> bool {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        match (bars.last(), trailing_max(&highs, HIGH_LOOKBACK)) {
            (Some(last), Some(high)) => last.close >= high * NEAR_HIGH_RATIO,
            _ => false,
        }
    }
}

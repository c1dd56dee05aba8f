//! Signal generator.
//!
//! Drives one screening run: for every configured market it fetches the
//! candidate list, analyses candidates one at a time, keeps graded signals
//! and finally ranks them.
//!
//! Per candidate:
//!
//! ```text
//! chart -> supply -> news -> classify -> throttle -> score -> grade -> size
//! ```
//!
//! Collaborator failures degrade to floors (see [`super::fallback`]). A failed
//! candidate list skips that market, and any other error inside the chain
//! drops only that candidate. Only config validation is fatal.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use jongga_common::{ScreenerConfig, Validate};

use crate::data::{
    CallThrottle, CandidateStock, Clock, MarketDataProvider, NewsProvider, TokioClock,
};
use crate::scoring::{ScoreEngine, ScoreInputs};
use crate::sentiment::SentimentClassifier;
use crate::signal::Signal;
use crate::sizing::PositionSizer;

use super::fallback::{
    bars_or_empty, candidates_or_empty, news_or_empty, supply_or_zero, verdict_or_keywords,
};
use super::report::ScreenerResult;

// ============================================================================
// Candidate Error
// ============================================================================

/// Reasons a single candidate is dropped.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("Invalid price {price} for {code}")]
    InvalidPrice { code: String, price: i64 },
}

// ============================================================================
// Signal Generator
// ============================================================================

/// Signals plus how many candidates were analysed to get them.
#[derive(Debug)]
struct ScanOutcome {
    signals: Vec<Signal>,
    candidates: usize,
}

/// Orchestrates a screening run.
pub struct SignalGenerator {
    config: ScreenerConfig,
    market_data: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    classifier: Arc<dyn SentimentClassifier>,
    scorer: ScoreEngine,
    sizer: PositionSizer,
    throttle: CallThrottle,
}

impl SignalGenerator {
    /// Create a generator on the wall clock.
    pub fn new(
        config: ScreenerConfig,
        market_data: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Result<Self> {
        Self::with_clock(config, market_data, news, classifier, Arc::new(TokioClock))
    }

    /// Create a generator with an explicit clock for the throttle.
    ///
    /// Fails when the configuration does not validate.
    pub fn with_clock(
        config: ScreenerConfig,
        market_data: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        classifier: Arc<dyn SentimentClassifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config
            .validate()
            .context("Invalid screener configuration")?;

        let throttle = CallThrottle::from_config(classifier.name(), &config.rate_limit, clock);
        let sizer = PositionSizer::new(config.risk.clone());

        Ok(Self {
            config,
            market_data,
            news,
            classifier,
            scorer: ScoreEngine::new(),
            sizer,
            throttle,
        })
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Ranked signals for `date`.
    pub async fn generate(&mut self, date: NaiveDate) -> Result<Vec<Signal>> {
        Ok(self.scan(date).await.signals)
    }

    /// Full run wrapped in a [`ScreenerResult`].
    pub async fn run(&mut self, date: NaiveDate) -> Result<ScreenerResult> {
        let started = Instant::now();
        let outcome = self.scan(date).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = ScreenerResult::new(date, outcome.candidates, outcome.signals, elapsed_ms);
        info!(
            date = %date,
            candidates = result.total_candidates,
            signals = result.filtered_count,
            duration_ms = elapsed_ms,
            "Screening run complete"
        );
        Ok(result)
    }

    async fn scan(&mut self, date: NaiveDate) -> ScanOutcome {
        info!(
            date = %date,
            markets = ?self.config.markets,
            capital = self.config.capital,
            "Starting screening run"
        );

        let markets = self.config.markets.clone();
        let mut signals = Vec::new();
        let mut analysed = 0;

        for market in &markets {
            let candidates = candidates_or_empty(
                self.market_data
                    .top_gainers(market, self.config.candidates_per_market, date)
                    .await,
                market,
            );

            info!(market = %market, count = candidates.len(), "Candidates fetched");

            for stock in candidates {
                analysed += 1;
                let code = stock.code.clone();

                match self.analyze_candidate(stock, date).await {
                    Ok(signal) if signal.grade.is_actionable() => {
                        info!(
                            code = %code,
                            grade = %signal.grade,
                            score = signal.total_score(),
                            shares = signal.position.share_count,
                            "Signal generated"
                        );
                        signals.push(signal);
                    }
                    Ok(signal) => {
                        debug!(code = %code, score = signal.total_score(), "Grade C, skipped");
                    }
                    Err(e) => {
                        warn!(code = %code, error = %e, "Candidate analysis failed, skipping");
                    }
                }
            }
        }

        rank_signals(&mut signals, self.config.risk.max_positions);

        ScanOutcome {
            signals,
            candidates: analysed,
        }
    }

    /// Analyse one candidate into a signal (of any grade).
    async fn analyze_candidate(
        &mut self,
        mut stock: CandidateStock,
        date: NaiveDate,
    ) -> Result<Signal> {
        if stock.current_price <= 0 {
            return Err(CandidateError::InvalidPrice {
                code: stock.code.clone(),
                price: stock.current_price,
            }
            .into());
        }

        let bars = bars_or_empty(
            self.market_data
                .chart_data(&stock.code, self.config.chart_days)
                .await,
            &stock.code,
        );

        let supply = supply_or_zero(
            self.market_data
                .supply_data(&stock.code, self.config.supply_days)
                .await,
            &stock.code,
        );
        stock.apply_supply(&supply);

        let news = news_or_empty(
            self.news
                .collect_news(&stock.name, &stock.code, self.config.news_max_items)
                .await,
            &stock.code,
        );

        let verdict = verdict_or_keywords(
            self.classifier.classify(&stock.name, &news).await,
            &news,
            &stock.code,
        );
        self.throttle.record_call().await;

        let (score, checklist) = self.scorer.calculate(&ScoreInputs {
            trading_value: stock.trading_value,
            change_pct: stock.change_pct,
            bars: &bars,
            news: &news,
            sentiment_score: verdict.score,
            sentiment_reason: &verdict.reason,
            supply: &supply,
        });
        let grade = self
            .scorer
            .determine_grade(&score, stock.trading_value, stock.change_pct);

        let (entry, stop, _target) = self.sizer.calculate_entry_stop_target(stock.current_price);
        let position = self.sizer.calculate(self.config.capital, grade, entry, stop);

        debug!(
            code = %stock.code,
            bars = bars.len(),
            news = news.len(),
            total = score.total(),
            grade = %grade,
            "Candidate scored"
        );

        Ok(Signal::new(stock, grade, score, checklist, position, news, date))
    }
}

/// Sort by grade (best first) then total score, and keep `2 * max_positions`.
///
/// The sort is stable, so ties keep discovery order.
pub fn rank_signals(signals: &mut Vec<Signal>, max_positions: usize) {
    signals.sort_by(|a, b| {
        a.grade
            .rank()
            .cmp(&b.grade.rank())
            .then_with(|| b.total_score().cmp(&a.total_score()))
    });
    signals.truncate(max_positions.saturating_mul(2));
}

//! Jongga Engine Library
//!
//! Closing-bet screener for KRX markets: near the close, rank the day's
//! strongest gainers, score them on news, liquidity, chart structure and
//! investor flows, grade them and size a risk-bounded position for each.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       SignalGenerator                               │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  MarketDataProvider ──┐                                             │
//! │  NewsProvider ────────┼──▶ ScoreEngine ──▶ PositionSizer ──▶ Signal │
//! │  SentimentClassifier ─┘    (+ grade)       (entry/stop/size)        │
//! │        │                                                            │
//! │   CallThrottle                                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Grades
//!
//! | grade | total | trading value |
//! |-------|-------|---------------|
//! | S     | ≥ 10  | ≥ 1조         |
//! | A     | ≥ 8   | ≥ 5000억      |
//! | B     | ≥ 6   | ≥ 1000억      |
//! | C     | rest  |               |
//!
//! C signals are scored but not reported.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod scoring;
pub mod screener;
pub mod sentiment;
pub mod signal;
pub mod sizing;

pub use data::{
    Bar, CandidateStock, CompositeNewsProvider, MarketDataProvider, MarketSnapshot, NewsItem,
    NewsProvider, ProviderError, SnapshotProvider, SupplyData,
};
pub use scoring::{ScoreEngine, ScoreInputs};
pub use screener::{RunSummary, ScreenerResult, SignalGenerator};
pub use sentiment::{
    ClassifierError, GeminiClassifier, KeywordClassifier, SentimentClassifier, SentimentVerdict,
};
pub use signal::{
    Checklist, Grade, PositionPlan, ScoreBreakdown, Signal, SignalRecord, SignalStatus,
};
pub use sizing::PositionSizer;

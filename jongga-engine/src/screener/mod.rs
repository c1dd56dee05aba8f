//! Screening run orchestration.
//!
//! [`SignalGenerator`] walks the configured markets, analyses each candidate
//! through the collaborator chain and returns ranked [`crate::signal::Signal`]s
//! wrapped in a [`ScreenerResult`].

pub mod engine;
pub mod fallback;
pub mod report;

pub use engine::{rank_signals, CandidateError, SignalGenerator};
pub use report::{RunSummary, ScreenerResult};

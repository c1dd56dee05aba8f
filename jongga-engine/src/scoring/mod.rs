//! Multi-factor scoring and grading.

mod engine;
pub mod indicators;

pub use engine::{ScoreEngine, ScoreInputs};

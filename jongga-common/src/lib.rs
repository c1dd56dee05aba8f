//! Jongga Common - shared configuration, errors and logging for the
//! closing-bet screener.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Error types and context helpers
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, ObservabilityConfig, RateLimitConfig, RiskConfig, ScreenerConfig, SentimentConfig,
    UniverseFilterConfig,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};

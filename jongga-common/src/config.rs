//! Configuration management for the closing-bet screener.
//!
//! The screener reads a single JSON file at `~/.jongga/config.json`.
//! Every field has a default, so a partial file (or no file at all) is valid.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (see below)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `JONGGA_LOG_LEVEL` → observability.log_level
//! - `JONGGA_LOG_FORMAT` → observability.log_format
//! - `GEMINI_API_KEY` / `GOOGLE_API_KEY` → sentiment.api_key

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::validation::Validate;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".jongga"),
        |dirs| dirs.home_dir().join(".jongga"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the screener.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Sentiment classifier client configuration
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Screening, scoring and sizing parameters
    #[serde(default)]
    pub screener: ScreenerConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::from(e).with_context(format!("reading {}", path.display())))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::from(e).with_context(format!("parsing {}", path.display())))
    }

    /// Load from `path` (or the default location), apply environment
    /// overrides and validate the result.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("JONGGA_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("JONGGA_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if self.sentiment.api_key.is_none() {
            self.sentiment.api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets pinned to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Sentiment Classifier Configuration
// ============================================================================

/// Settings for the remote news-sentiment classifier.
///
/// Without an API key the screener runs on the local keyword heuristic only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_sentiment_endpoint")]
    pub endpoint: String,

    /// Model name used in `models/{model}:generateContent`
    #[serde(default = "default_sentiment_model")]
    pub model: String,

    /// API key (usually supplied through the environment)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_sentiment_timeout_secs")]
    pub timeout_secs: u64,

    /// Headlines included in the prompt
    #[serde(default = "default_prompt_headlines")]
    pub prompt_headlines: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_sentiment_endpoint(),
            model: default_sentiment_model(),
            api_key: None,
            timeout_secs: default_sentiment_timeout_secs(),
            prompt_headlines: default_prompt_headlines(),
        }
    }
}

fn default_sentiment_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_sentiment_model() -> String {
    "gemini-2.0-flash-exp".into()
}

fn default_sentiment_timeout_secs() -> u64 {
    30
}

fn default_prompt_headlines() -> usize {
    5
}

// ============================================================================
// Screener Configuration
// ============================================================================

/// Screening run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Capital used for position sizing
    #[serde(default = "default_capital")]
    pub capital: f64,

    /// Markets scanned in order
    #[serde(default = "default_markets")]
    pub markets: Vec<String>,

    /// Candidates requested per market
    #[serde(default = "default_candidates_per_market")]
    pub candidates_per_market: usize,

    /// Daily bars requested per candidate
    #[serde(default = "default_chart_days")]
    pub chart_days: usize,

    /// Days of investor flow requested per candidate
    #[serde(default = "default_supply_days")]
    pub supply_days: usize,

    /// News items requested per candidate
    #[serde(default = "default_news_max_items")]
    pub news_max_items: usize,

    /// Candidate universe bounds
    #[serde(default)]
    pub filters: UniverseFilterConfig,

    /// Risk and sizing parameters
    #[serde(default)]
    pub risk: RiskConfig,

    /// Classifier call budget
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            capital: default_capital(),
            markets: default_markets(),
            candidates_per_market: default_candidates_per_market(),
            chart_days: default_chart_days(),
            supply_days: default_supply_days(),
            news_max_items: default_news_max_items(),
            filters: UniverseFilterConfig::default(),
            risk: RiskConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

fn default_capital() -> f64 {
    50_000_000.0
}

fn default_markets() -> Vec<String> {
    vec!["KOSPI".to_string(), "KOSDAQ".to_string()]
}

fn default_candidates_per_market() -> usize {
    30
}

fn default_chart_days() -> usize {
    60
}

fn default_supply_days() -> usize {
    20
}

fn default_news_max_items() -> usize {
    5
}

// ============================================================================
// Universe Filter Configuration
// ============================================================================

/// Bounds applied by market-data providers before candidates reach the screener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseFilterConfig {
    /// Minimum trading value (KRW)
    #[serde(default = "default_min_trading_value")]
    pub min_trading_value: u64,

    /// Minimum closing price (KRW)
    #[serde(default = "default_min_price")]
    pub min_price: i64,

    /// Maximum closing price (KRW)
    #[serde(default = "default_max_price")]
    pub max_price: i64,

    /// Minimum daily change (%)
    #[serde(default = "default_min_change_pct")]
    pub min_change_pct: f64,

    /// Maximum daily change (%), just under the daily limit
    #[serde(default = "default_max_change_pct")]
    pub max_change_pct: f64,

    /// Candidates whose name contains any of these are dropped
    #[serde(default = "default_exclude_keywords")]
    pub exclude_keywords: Vec<String>,
}

impl Default for UniverseFilterConfig {
    fn default() -> Self {
        Self {
            min_trading_value: default_min_trading_value(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            min_change_pct: default_min_change_pct(),
            max_change_pct: default_max_change_pct(),
            exclude_keywords: default_exclude_keywords(),
        }
    }
}

fn default_min_trading_value() -> u64 {
    50_000_000_000 // 500억
}

fn default_min_price() -> i64 {
    1_000
}

fn default_max_price() -> i64 {
    1_000_000
}

fn default_min_change_pct() -> f64 {
    5.0
}

fn default_max_change_pct() -> f64 {
    29.9
}

fn default_exclude_keywords() -> Vec<String> {
    ["스팩", "SPAC", "ETF", "ETN", "리츠", "우B", "인버스", "레버리지"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// ============================================================================
// Risk Configuration
// ============================================================================

/// Risk budget and per-grade sizing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of capital risked per trade (the R-value)
    #[serde(default = "default_r_ratio")]
    pub r_ratio: f64,

    /// Stop distance below entry, as a fraction
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    /// Target distance above entry, as a fraction
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,

    /// R multiplier keyed by grade letter ("S", "A", "B", "C")
    #[serde(default = "default_grade_multipliers")]
    pub grade_multipliers: BTreeMap<String, f64>,

    /// Daily loss limit in R
    #[serde(default = "default_daily_loss_limit_r")]
    pub daily_loss_limit_r: f64,

    /// Weekly loss limit in R
    #[serde(default = "default_weekly_loss_limit_r")]
    pub weekly_loss_limit_r: f64,

    /// Maximum concurrent positions; output is capped at twice this
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            r_ratio: default_r_ratio(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            grade_multipliers: default_grade_multipliers(),
            daily_loss_limit_r: default_daily_loss_limit_r(),
            weekly_loss_limit_r: default_weekly_loss_limit_r(),
            max_positions: default_max_positions(),
        }
    }
}

fn default_r_ratio() -> f64 {
    0.005
}

fn default_stop_loss_pct() -> f64 {
    0.03
}

fn default_take_profit_pct() -> f64 {
    0.05
}

fn default_grade_multipliers() -> BTreeMap<String, f64> {
    [("S", 2.0), ("A", 1.5), ("B", 1.0), ("C", 0.5)]
        .into_iter()
        .map(|(grade, multiplier)| (grade.to_string(), multiplier))
        .collect()
}

fn default_daily_loss_limit_r() -> f64 {
    2.0
}

fn default_weekly_loss_limit_r() -> f64 {
    4.0
}

fn default_max_positions() -> usize {
    5
}

// ============================================================================
// Rate Limit Configuration
// ============================================================================

/// Classifier call budget: `max_calls` per `window_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_calls")]
    pub max_calls: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_calls() -> u32 {
    15
}

fn default_window_secs() -> u64 {
    60
}

// ============================================================================
// Tests
// ============================================================================

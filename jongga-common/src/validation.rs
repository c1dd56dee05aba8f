//! Configuration validation.
//!
//! Catches values that would make scoring or sizing meaningless before a run
//! starts. A failed validation is fatal for the run.

use thiserror::Error;

use crate::config::{
    Config, ObservabilityConfig, RateLimitConfig, RiskConfig, ScreenerConfig, SentimentConfig,
    UniverseFilterConfig,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

fn fraction_in_open_unit(field: &str, value: f64) -> Option<ValidationError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        None
    } else {
        Some(invalid(field, format!("must be in (0, 1), got {}", value)))
    }
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let errors: Vec<ValidationError> = [
            self.observability.validate(),
            self.sentiment.validate(),
            self.screener.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        collect(errors)
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(invalid(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(invalid(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

impl Validate for SentimentConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "sentiment.model".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(invalid("sentiment.timeout_secs", "must be positive"));
        }
        Ok(())
    }
}

impl Validate for ScreenerConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if !(self.capital.is_finite() && self.capital > 0.0) {
            errors.push(invalid("screener.capital", "must be a positive amount"));
        }
        if self.markets.is_empty() {
            errors.push(ValidationError::MissingField {
                field: "screener.markets".into(),
            });
        }
        if self.candidates_per_market == 0 {
            errors.push(invalid("screener.candidates_per_market", "must be positive"));
        }
        if self.chart_days == 0 {
            errors.push(invalid("screener.chart_days", "must be positive"));
        }

        for result in [
            self.filters.validate(),
            self.risk.validate(),
            self.rate_limit.validate(),
        ] {
            match result {
                Ok(()) => {}
                Err(ValidationError::Multiple(nested)) => errors.extend(nested),
                Err(e) => errors.push(e),
            }
        }

        collect(errors)
    }
}

impl Validate for UniverseFilterConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.min_price > self.max_price {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "screener.filters.min_price ({}) exceeds max_price ({})",
                    self.min_price, self.max_price
                ),
            });
        }
        if self.min_change_pct > self.max_change_pct {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "screener.filters.min_change_pct ({}) exceeds max_change_pct ({})",
                    self.min_change_pct, self.max_change_pct
                ),
            });
        }

        collect(errors)
    }
}

impl Validate for RiskConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            fraction_in_open_unit("screener.risk.r_ratio", self.r_ratio),
            fraction_in_open_unit("screener.risk.stop_loss_pct", self.stop_loss_pct),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !(self.take_profit_pct.is_finite() && self.take_profit_pct > 0.0) {
            errors.push(invalid("screener.risk.take_profit_pct", "must be positive"));
        }
        if !self.grade_multipliers.contains_key("C") {
            errors.push(ValidationError::MissingField {
                field: "screener.risk.grade_multipliers.C".into(),
            });
        }
        for (grade, multiplier) in &self.grade_multipliers {
            if !(multiplier.is_finite() && *multiplier >= 0.0) {
                errors.push(invalid(
                    &format!("screener.risk.grade_multipliers.{}", grade),
                    "must be a non-negative number",
                ));
            }
        }
        if !(self.daily_loss_limit_r > 0.0 && self.weekly_loss_limit_r > 0.0) {
            errors.push(invalid(
                "screener.risk.loss_limits",
                "daily and weekly limits must be positive",
            ));
        }
        if self.max_positions == 0 {
            errors.push(invalid("screener.risk.max_positions", "must be positive"));
        }

        collect(errors)
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.max_calls == 0 {
            return Err(invalid("screener.rate_limit.max_calls", "must be positive"));
        }
        Ok(())
    }
}

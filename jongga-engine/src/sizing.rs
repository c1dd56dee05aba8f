//! Position sizing.
//!
//! Every trade risks the same R-value, a fixed fraction of capital. The share
//! count is how many units fit inside R at the planned stop, scaled by a
//! per-grade multiplier:
//!
//! ```text
//! r_value     = capital * r_ratio
//! base_units  = floor(r_value / (entry - stop))
//! final_units = floor(base_units * multiplier(grade))
//! ```
//!
//! The multiplier is applied after flooring `base_units`.

use tracing::debug;

use jongga_common::RiskConfig;

use crate::signal::{Grade, PositionPlan};

/// Multiplier used when neither the grade nor C is in the table.
const FALLBACK_MULTIPLIER: f64 = 0.5;

/// Stateless sizer over a [`RiskConfig`].
#[derive(Debug, Clone)]
pub struct PositionSizer {
    risk: RiskConfig,
}

impl PositionSizer {
    pub fn new(risk: RiskConfig) -> Self {
        Self { risk }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.risk
    }

    /// Capital at risk per trade.
    pub fn r_value(&self, capital: f64) -> f64 {
        capital * self.risk.r_ratio
    }

    /// Multiplier for `grade`; unknown grades use C's entry.
    pub fn multiplier_for(&self, grade: Grade) -> f64 {
        self.risk
            .grade_multipliers
            .get(grade.as_str())
            .or_else(|| self.risk.grade_multipliers.get(Grade::C.as_str()))
            .copied()
            .unwrap_or(FALLBACK_MULTIPLIER)
    }

    /// Entry, stop and target for a candidate trading at `current_price`.
    pub fn calculate_entry_stop_target(&self, current_price: i64) -> (i64, i64, i64) {
        let price = current_price as f64;
        let stop = (price * (1.0 - self.risk.stop_loss_pct)).floor() as i64;
        let target = (price * (1.0 + self.risk.take_profit_pct)).floor() as i64;
        (current_price, stop, target)
    }

    /// Size a position for `grade` between `entry_price` and `stop_price`.
    ///
    /// A stop at or above the entry falls back to `entry * stop_loss_pct` as
    /// the per-unit risk.
    pub fn calculate(
        &self,
        capital: f64,
        grade: Grade,
        entry_price: i64,
        stop_price: i64,
    ) -> PositionPlan {
        let mut risk_per_unit = entry_price - stop_price;
        if risk_per_unit <= 0 {
            risk_per_unit = (entry_price as f64 * self.risk.stop_loss_pct).floor() as i64;
            debug!(
                entry = entry_price,
                stop = stop_price,
                fallback = risk_per_unit,
                "Stop not below entry, using fallback risk"
            );
        }

        let r_value = self.r_value(capital);
        let base_units = if risk_per_unit > 0 {
            (r_value / risk_per_unit as f64).floor() as u64
        } else {
            0
        };

        let grade_multiplier = self.multiplier_for(grade);
        let share_count = (base_units as f64 * grade_multiplier).floor() as u64;
        let units = share_count as i64;

        PositionPlan {
            entry_price,
            stop_price,
            target_price: (entry_price as f64 * (1.0 + self.risk.take_profit_pct)).floor() as i64,
            share_count,
            total_notional: units * entry_price,
            risk_per_unit,
            risk_amount: units * risk_per_unit,
            r_value,
            grade_multiplier,
        }
    }

    /// True when today's losses reach the daily limit and trading should halt.
    pub fn check_daily_loss_limit(&self, losses: f64, capital: f64) -> bool {
        losses >= self.r_value(capital) * self.risk.daily_loss_limit_r
    }

    /// True when this week's losses reach the weekly limit.
    pub fn check_weekly_loss_limit(&self, losses: f64, capital: f64) -> bool {
        losses >= self.r_value(capital) * self.risk.weekly_loss_limit_r
    }
}

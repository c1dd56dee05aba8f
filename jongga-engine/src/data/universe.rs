//! Candidate universe selection.
//!
//! Turns a market's raw daily rows into the ranked candidate list the
//! screener analyses: bounds on trading value, price and change percent,
//! ranking by change percent, then name-based exclusions.

use serde::{Deserialize, Serialize};

use jongga_common::UniverseFilterConfig;

use super::CandidateStock;

/// One row of a market's daily price table, before filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub sector: String,
    pub close: i64,
    pub change_pct: f64,
    pub trading_value: u64,
}

/// Applies [`UniverseFilterConfig`] to raw market rows.
#[derive(Debug, Clone)]
pub struct UniverseFilter {
    config: UniverseFilterConfig,
}

impl UniverseFilter {
    pub fn new(config: UniverseFilterConfig) -> Self {
        Self { config }
    }

    /// Row is inside the value, change and price bounds (all inclusive).
    pub fn within_bounds(&self, row: &MarketRow) -> bool {
        row.trading_value >= self.config.min_trading_value
            && row.change_pct >= self.config.min_change_pct
            && row.change_pct <= self.config.max_change_pct
            && row.close >= self.config.min_price
            && row.close <= self.config.max_price
    }

    /// Name contains one of the exclusion keywords (SPACs, ETFs, preferreds...).
    pub fn is_excluded(&self, name: &str) -> bool {
        self.config
            .exclude_keywords
            .iter()
            .any(|kw| !kw.is_empty() && name.contains(kw.as_str()))
    }

    /// Select up to `top_n` candidates for `market`.
    ///
    /// Rows are ranked by change percent, the top `top_n` are taken, and only
    /// then are excluded names removed, so the result can be shorter than
    /// `top_n` even when more eligible rows exist.
    pub fn select(&self, market: &str, rows: &[MarketRow], top_n: usize) -> Vec<CandidateStock> {
        let mut eligible: Vec<&MarketRow> = rows.iter().filter(|r| self.within_bounds(r)).collect();
        eligible.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));

        eligible
            .into_iter()
            .take(top_n)
            .filter(|r| !self.is_excluded(&r.name))
            .map(|r| CandidateStock {
                code: r.code.clone(),
                name: r.name.clone(),
                market: market.to_string(),
                sector: r.sector.clone(),
                current_price: r.close,
                change_pct: r.change_pct,
                trading_value: r.trading_value,
                foreign_5d: 0,
                inst_5d: 0,
                foreign_20d: 0,
                inst_20d: 0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, close: i64, change_pct: f64, trading_value: u64) -> MarketRow {
        MarketRow {
            code: code.into(),
            name: name.into(),
            sector: String::new(),
            close,
            change_pct,
            trading_value,
        }
    }

    fn filter() -> UniverseFilter {
        UniverseFilter::new(UniverseFilterConfig::default())
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let f = filter();
        assert!(f.within_bounds(&row("A", "a", 1_000, 5.0, 50_000_000_000)));
        assert!(f.within_bounds(&row("B", "b", 1_000_000, 29.9, 50_000_000_000)));
        assert!(!f.within_bounds(&row("C", "c", 999, 10.0, 90_000_000_000)));
        assert!(!f.within_bounds(&row("D", "d", 5_000, 4.99, 90_000_000_000)));
        assert!(!f.within_bounds(&row("E", "e", 5_000, 30.0, 90_000_000_000)));
        assert!(!f.within_bounds(&row("F", "f", 5_000, 10.0, 49_999_999_999)));
    }

    #[test]
    fn test_select_ranks_by_change() {
        let rows = vec![
            row("000001", "알파", 10_000, 6.0, 80_000_000_000),
            row("000002", "베타", 20_000, 12.5, 80_000_000_000),
            row("000003", "감마", 30_000, 9.0, 80_000_000_000),
        ];

        let selected = filter().select("KOSPI", &rows, 10);
        let codes: Vec<&str> = selected.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["000002", "000003", "000001"]);
        assert!(selected.iter().all(|c| c.market == "KOSPI"));
        assert_eq!(selected[0].current_price, 20_000);
    }

    #[test]
    fn test_exclusion_applies_after_truncation() {
        let rows = vec![
            row("000001", "스팩1호", 2_000, 25.0, 80_000_000_000),
            row("000002", "베타", 20_000, 12.5, 80_000_000_000),
            row("000003", "감마", 30_000, 9.0, 80_000_000_000),
        ];

        let selected = filter().select("KOSDAQ", &rows, 2);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].code, "000002");
    }

    #[test]
    fn test_empty_keyword_excludes_nothing() {
        let f = UniverseFilter::new(UniverseFilterConfig {
            exclude_keywords: vec![String::new()],
            ..UniverseFilterConfig::default()
        });
        assert!(!f.is_excluded("삼성전자"));
        assert!(filter().is_excluded("KODEX 레버리지"));
    }
}

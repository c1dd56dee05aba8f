//! File-backed provider for offline runs.
//!
//! A snapshot is one JSON document holding a trading day's market tables,
//! per-code bars, flows and headlines. It serves both provider traits, which
//! makes it the data source of the CLI and of reproducible test runs.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use jongga_common::error::ResultExt;
use jongga_common::UniverseFilterConfig;

use super::{
    Bar, CandidateStock, MarketDataProvider, MarketRow, NewsItem, NewsProvider, ProviderError,
    SupplyData, UniverseFilter,
};

/// A trading day's worth of screener inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Trading date the tables describe
    pub date: Option<NaiveDate>,

    /// Raw daily rows keyed by market name
    #[serde(default)]
    pub markets: HashMap<String, Vec<MarketRow>>,

    /// Daily bars keyed by code, oldest first
    #[serde(default)]
    pub charts: HashMap<String, Vec<Bar>>,

    /// Flow aggregates keyed by code
    #[serde(default)]
    pub supply: HashMap<String, SupplyData>,

    /// Headlines keyed by code, newest first
    #[serde(default)]
    pub news: HashMap<String, Vec<NewsItem>>,
}

impl MarketSnapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> jongga_common::Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("reading snapshot {}", path.display()))?;

        serde_json::from_str(&content).context(format!("parsing snapshot {}", path.display()))
    }
}

/// Serves a [`MarketSnapshot`] through the provider traits.
pub struct SnapshotProvider {
    snapshot: MarketSnapshot,
    filter: UniverseFilter,
}

impl SnapshotProvider {
    pub fn new(snapshot: MarketSnapshot, filters: UniverseFilterConfig) -> Self {
        Self {
            snapshot,
            filter: UniverseFilter::new(filters),
        }
    }

    /// Trading date recorded in the snapshot, if any.
    pub fn date(&self) -> Option<NaiveDate> {
        self.snapshot.date
    }
}

#[async_trait]
impl MarketDataProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn top_gainers(
        &self,
        market: &str,
        count: usize,
        date: NaiveDate,
    ) -> Result<Vec<CandidateStock>, ProviderError> {
        if let Some(snapshot_date) = self.snapshot.date {
            if snapshot_date != date {
                warn!(
                    requested = %date,
                    snapshot = %snapshot_date,
                    "Snapshot date differs from requested date"
                );
            }
        }

        let rows = self.snapshot.markets.get(market).ok_or_else(|| {
            ProviderError::DataNotAvailable(format!("market {} not in snapshot", market))
        })?;

        let candidates = self.filter.select(market, rows, count);
        debug!(
            market = %market,
            rows = rows.len(),
            selected = candidates.len(),
            "Universe filtered"
        );
        Ok(candidates)
    }

    async fn chart_data(&self, code: &str, days: usize) -> Result<Vec<Bar>, ProviderError> {
        let bars = self.snapshot.charts.get(code).map_or(&[][..], Vec::as_slice);
        let start = bars.len().saturating_sub(days);
        Ok(bars[start..].to_vec())
    }

    async fn supply_data(&self, code: &str, _days: usize) -> Result<SupplyData, ProviderError> {
        self.snapshot
            .supply
            .get(code)
            .copied()
            .ok_or_else(|| ProviderError::DataNotAvailable(format!("no flows for {}", code)))
    }
}

#[async_trait]
impl NewsProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn collect_news(
        &self,
        _name: &str,
        code: &str,
        max_items: usize,
    ) -> Result<Vec<NewsItem>, ProviderError> {
        Ok(self
            .snapshot
            .news
            .get(code)
            .map(|items| items.iter().take(max_items).cloned().collect())
            .unwrap_or_default())
    }
}

//! Screening runs driven from a snapshot file, the way the CLI runs them.

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

use jongga_common::ScreenerConfig;
use jongga_engine::{KeywordClassifier, MarketSnapshot, SignalGenerator, SnapshotProvider};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn rising_chart() -> Vec<Value> {
    (0..60i64)
        .map(|i| {
            let close = 100.0 + i as f64;
            json!({
                "date": (day() - chrono::Duration::days(59 - i)).to_string(),
                "open": close - 0.5,
                "high": close + 0.05,
                "low": close - 1.0,
                "close": close,
                "volume": 1000.0
            })
        })
        .collect()
}

fn snapshot_file() -> NamedTempFile {
    let snapshot = json!({
        "date": "2026-10-16",
        "markets": {
            "KOSPI": [
                {"code": "005930", "name": "대형주", "sector": "전기전자", "close": 70000,
                 "change_pct": 9.5, "trading_value": 1_200_000_000_000u64},
                {"code": "000100", "name": "중형주", "close": 20000,
                 "change_pct": 6.0, "trading_value": 600_000_000_000u64},
                {"code": "900001", "name": "한국스팩1호", "close": 2100,
                 "change_pct": 7.0, "trading_value": 80_000_000_000u64},
                {"code": "035720", "name": "저가주", "close": 500,
                 "change_pct": 15.0, "trading_value": 90_000_000_000u64}
            ]
        },
        "charts": {"005930": rising_chart()},
        "supply": {
            "005930": {"foreign_5d": 120000, "inst_5d": 80000, "foreign_20d": 300000, "inst_20d": 150000}
        },
        "news": {
            "005930": [
                {"title": "대규모 수주 공시", "source": "finance"},
                {"title": "FDA 승인 획득", "source": "search"},
                {"title": "특허 취득", "source": "finance"}
            ],
            "000100": [{"title": "분기 실적 발표", "source": "finance"}]
        }
    });

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", snapshot).unwrap();
    file
}

fn kospi_only() -> ScreenerConfig {
    let mut config = ScreenerConfig::default();
    config.markets = vec!["KOSPI".into()];
    config
}

fn generator(config: ScreenerConfig, snapshot: MarketSnapshot) -> SignalGenerator {
    let provider = Arc::new(SnapshotProvider::new(snapshot, config.filters.clone()));
    SignalGenerator::new(config, provider.clone(), provider, Arc::new(KeywordClassifier)).unwrap()
}

#[tokio::test]
async fn test_snapshot_run_produces_flat_records() {
    let file = snapshot_file();
    let snapshot = MarketSnapshot::load(file.path()).unwrap();
    assert_eq!(snapshot.date, Some(day()));

    let mut screener = generator(kospi_only(), snapshot);
    let result = screener.run(day()).await.unwrap();

    // the SPAC and the sub-1000 row never become candidates
    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.filtered_count, 1);

    let records = serde_json::to_value(result.records()).unwrap();
    let record = &records[0];

    assert_eq!(record["code"], "005930");
    assert_eq!(record["sector"], "전기전자");
    assert_eq!(record["grade"], "S");
    assert_eq!(record["status"], "OPEN");
    assert_eq!(record["signal_date"], "2026-10-16");

    // 3 + 3 + 2 + 1 + 0 + 2
    assert_eq!(record["total_score"], 11);
    assert_eq!(record["score_news"], 3);
    assert_eq!(record["score_chart"], 2);
    assert_eq!(record["score_candle"], 1);
    assert_eq!(record["score_consolidation"], 0);
    assert_eq!(record["rationale"], "positive keywords (4)");

    assert_eq!(record["has_news"], true);
    assert_eq!(record["news_sources"], json!(["finance", "search"]));
    assert_eq!(record["supply_positive"], true);
    assert_eq!(record["foreign_20d"], 300000);

    // R = 250,000 at 2,100 risk per share: 119 base shares, doubled for S
    assert_eq!(record["entry_price"], 70000);
    assert_eq!(record["stop_price"], 67900);
    assert_eq!(record["target_price"], 73500);
    assert_eq!(record["share_count"], 238);
    assert_eq!(record["total_notional"], 16_660_000);
    assert_eq!(record["risk_amount"], 499_800);
    assert_eq!(record["news_items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_market_missing_from_snapshot_is_skipped() {
    let file = snapshot_file();
    let snapshot = MarketSnapshot::load(file.path()).unwrap();

    // default config also scans KOSDAQ, which the snapshot lacks
    let mut screener = generator(ScreenerConfig::default(), snapshot);
    let result = screener.run(day()).await.unwrap();

    assert_eq!(result.total_candidates, 2);
    assert_eq!(result.filtered_count, 1);
    assert_eq!(result.signals[0].stock.code, "005930");
}

#[test]
fn test_malformed_snapshot_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"markets\": [1, 2]").unwrap();
    assert!(MarketSnapshot::load(file.path()).is_err());
}

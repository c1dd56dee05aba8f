//! Jongga Engine - one screening pass over a market snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use jongga_common::config::Config;
use jongga_common::logging::init_from_config;
use jongga_engine::{
    GeminiClassifier, KeywordClassifier, MarketSnapshot, SentimentClassifier, SignalGenerator,
    SnapshotProvider,
};

#[derive(Parser, Debug)]
#[command(name = "jongga-engine")]
#[command(version)]
#[command(about = "Closing-bet screener: score, grade and size today's gainers", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.jongga/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Market snapshot JSON to screen
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Override capital used for sizing
    #[arg(long)]
    capital: Option<f64>,

    /// Markets to scan (repeatable); defaults to the configured list
    #[arg(short, long = "market")]
    markets: Vec<String>,

    /// Signal date (YYYY-MM-DD); defaults to the snapshot date, then today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print flat signal records instead of the full result
    #[arg(long)]
    flat: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_with_env(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_from_config(&config.observability);
    tracing::info!("Jongga Engine v{}", env!("CARGO_PKG_VERSION"));

    if let Some(capital) = cli.capital {
        config.screener.capital = capital;
    }
    if !cli.markets.is_empty() {
        config.screener.markets = cli.markets.clone();
    }

    let snapshot = MarketSnapshot::load(&cli.snapshot)?;
    let date = cli
        .date
        .or(snapshot.date)
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let provider = Arc::new(SnapshotProvider::new(
        snapshot,
        config.screener.filters.clone(),
    ));

    let gemini = GeminiClassifier::new(config.sentiment.clone());
    let classifier: Arc<dyn SentimentClassifier> = if gemini.is_configured() {
        tracing::info!(model = %config.sentiment.model, "Using remote sentiment classifier");
        Arc::new(gemini)
    } else {
        tracing::info!("No API key configured, using keyword heuristic");
        Arc::new(KeywordClassifier)
    };

    let mut generator = SignalGenerator::new(
        config.screener.clone(),
        provider.clone(),
        provider,
        classifier,
    )?;

    let result = generator.run(date).await?;
    tracing::info!("{}", result.summary());

    let output = match (cli.flat, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(&result.records()),
        (true, false) => serde_json::to_string(&result.records()),
        (false, true) => serde_json::to_string_pretty(&result),
        (false, false) => serde_json::to_string(&result),
    }
    .context("Failed to serialize screener result")?;

    println!("{}", output);
    Ok(())
}

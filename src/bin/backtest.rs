//! Backtest runner binary.
//!
//! A thin CLI wiring a single route through the engine, in the style of
//! the source's small focused `[[bin]]` entries (`bin/benchmark.rs`,
//! `bin/optimize.rs`): parse args, build a request, run, print a summary.

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rustrade::application::simulator::{self, BacktestRequest};
use rustrade::application::strategy::StrategyRegistry;
use rustrade::config::SimulationConfig;
use rustrade::domain::market::timeframe::Timeframe;
use rustrade::domain::trading::types::Route;
use rustrade::infrastructure::candle_loader::CsvCandleLoader;

#[derive(Parser)]
#[command(author, version, about = "Deterministic backtest runner", long_about = None)]
struct Cli {
    /// Start date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    start_date: String,

    /// Finish date (YYYY-MM-DD), exclusive.
    #[arg(long)]
    finish_date: String,

    /// Exchange identifier the candle fixtures are filed under.
    #[arg(long, default_value = "binance")]
    exchange: String,

    /// Trading symbol.
    #[arg(long, default_value = "BTC-USDT")]
    symbol: String,

    /// Route timeframe (e.g. 1m, 5m, 1h, 1d).
    #[arg(long, default_value = "1m")]
    timeframe: String,

    /// Registered strategy name.
    #[arg(long, default_value = "buy_and_hold")]
    strategy: String,

    /// Starting cash on the route's exchange.
    #[arg(long, default_value = "10000")]
    initial_cash: f64,

    /// Directory holding `<exchange>/<symbol>.csv` candle fixtures.
    #[arg(long, default_value = "data")]
    candle_dir: String,
}

fn parse_timeframe(raw: &str) -> Result<Timeframe> {
    match raw {
        "1m" => Ok(Timeframe::OneMin),
        "3m" => Ok(Timeframe::ThreeMin),
        "5m" => Ok(Timeframe::FiveMin),
        "15m" => Ok(Timeframe::FifteenMin),
        "30m" => Ok(Timeframe::ThirtyMin),
        "1h" => Ok(Timeframe::OneHour),
        "2h" => Ok(Timeframe::TwoHour),
        "3h" => Ok(Timeframe::ThreeHour),
        "4h" => Ok(Timeframe::FourHour),
        "6h" => Ok(Timeframe::SixHour),
        "8h" => Ok(Timeframe::EightHour),
        "1d" => Ok(Timeframe::OneDay),
        other => anyhow::bail!("unsupported timeframe '{other}'"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = SimulationConfig::from_env();

    let timeframe = parse_timeframe(&cli.timeframe)?;
    let route = Route::new(&cli.exchange, &cli.symbol, timeframe, &cli.strategy);

    let mut initial_cash = HashMap::new();
    initial_cash.insert(cli.exchange.clone(), cli.initial_cash);

    let request = BacktestRequest {
        start_date: cli.start_date,
        finish_date: cli.finish_date,
        routes: vec![route],
        initial_cash,
        fee_rate: config.fee_rate,
        tick: config.tick,
    };

    let loader = CsvCandleLoader::new(&cli.candle_dir);
    let registry = StrategyRegistry::new();
    let report = simulator::run(&loader, &registry, request)
        .await
        .context("backtest run failed")?;

    info!(
        trades = report.trades.len(),
        final_equity = report.final_equity,
        "backtest complete"
    );
    println!("trades: {}", report.trades.len());
    println!("final equity: {:.2}", report.final_equity);
    println!("daily balances: {:?}", report.daily_balance);

    Ok(())
}

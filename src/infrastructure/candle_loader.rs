//! CSV-backed implementation of `CandleLoader`.
//!
//! Historical candles are read from `<root>/<exchange>/<symbol>.csv`, one
//! 1-minute OHLCV row per line. This is the on-disk counterpart to the
//! source's exchange REST clients (`infrastructure::binance`), but for a
//! simulation engine the "exchange" is a directory of recorded candles
//! rather than a live API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::market::candle::Candle;
use crate::domain::ports::CandleLoader;

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp_ms: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        Candle::new(row.timestamp_ms, row.open, row.high, row.low, row.close, row.volume)
    }
}

/// Reads 1-minute candles from CSV files rooted at `base_dir`.
pub struct CsvCandleLoader {
    base_dir: PathBuf,
}

impl CsvCandleLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, exchange: &str, symbol: &str) -> PathBuf {
        self.base_dir.join(exchange).join(format!("{symbol}.csv"))
    }
}

#[async_trait]
impl CandleLoader for CsvCandleLoader {
    async fn load(&self, exchange: &str, symbol: &str, start_ms: i64, finish_ms: i64) -> Result<Vec<Candle>> {
        let path = self.path_for(exchange, symbol);
        debug!(?path, start_ms, finish_ms, "loading candles from csv");
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("opening candle file {}", path.display()))?;

        let mut candles = Vec::new();
        for result in reader.deserialize() {
            let row: CandleRow = result.with_context(|| format!("parsing row in {}", path.display()))?;
            if row.timestamp_ms >= start_ms && row.timestamp_ms <= finish_ms {
                candles.push(Candle::from(row));
            }
        }
        candles.sort_by_key(|c| c.timestamp_ms);
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_and_filters_rows_within_range() {
        let dir = tempfile_dir();
        std::fs::create_dir_all(dir.join("binance")).unwrap();
        let mut file = std::fs::File::create(dir.join("binance").join("BTC-USDT.csv")).unwrap();
        writeln!(file, "timestamp_ms,open,high,low,close,volume").unwrap();
        writeln!(file, "0,100,101,99,100,1").unwrap();
        writeln!(file, "60000,100,101,99,100,1").unwrap();
        writeln!(file, "120000,100,101,99,100,1").unwrap();
        drop(file);

        let loader = CsvCandleLoader::new(&dir);
        let candles = loader.load("binance", "BTC-USDT", 0, 60_000).await.unwrap();
        assert_eq!(candles.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    fn tempfile_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("rustrade-csv-loader-test-{}", std::process::id()));
        dir
    }
}

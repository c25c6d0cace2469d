use anyhow::Result;
use async_trait::async_trait;

use crate::domain::market::candle::Candle;

/// Loads raw 1-minute candles for an `(exchange, symbol)` pair over a date
/// range. `start_ms` and `finish_ms` are both inclusive. The concrete adapter
/// (CSV file, database, in-memory fixture) lives in `infrastructure`; the
/// simulator only depends on this trait.
#[async_trait]
pub trait CandleLoader: Send + Sync {
    async fn load(
        &self,
        exchange: &str,
        symbol: &str,
        start_ms: i64,
        finish_ms: i64,
    ) -> Result<Vec<Candle>>;
}

/// An optional write-through cache in front of a `CandleLoader`, so repeated
/// backtest runs over the same range don't re-read the source every time.
#[async_trait]
pub trait CandleCache: Send + Sync {
    async fn get(
        &self,
        exchange: &str,
        symbol: &str,
        start_ms: i64,
        finish_ms: i64,
    ) -> Result<Option<Vec<Candle>>>;

    async fn put(
        &self,
        exchange: &str,
        symbol: &str,
        start_ms: i64,
        finish_ms: i64,
        candles: Vec<Candle>,
    ) -> Result<()>;
}

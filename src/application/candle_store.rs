use std::collections::HashMap;

use crate::domain::errors::SimulationError;
use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;

type SeriesKey = (String, String, Timeframe);

/// Holds the per-(exchange,symbol,timeframe) ordered candle sequences for the
/// duration of a run (spec.md C1).
#[derive(Debug, Default)]
pub struct CandleStore {
    series: HashMap<SeriesKey, Vec<Candle>>,
}

impl CandleStore {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    /// Pre-reserve capacity for a series to avoid reallocation in the hot loop.
    pub fn init(&mut self, exchange: &str, symbol: &str, timeframe: Timeframe, capacity: usize) {
        let key = (exchange.to_string(), symbol.to_string(), timeframe);
        self.series
            .entry(key)
            .or_insert_with(|| Vec::with_capacity(capacity));
    }

    /// Append a candle, or overwrite the tail if it shares the same
    /// timestamp (the matching engine rewrites the current minute's tail
    /// each time it splits off a new piece).
    pub fn add_candle(
        &mut self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
        candle: Candle,
    ) -> Result<(), SimulationError> {
        let key = (exchange.to_string(), symbol.to_string(), timeframe);
        let series = self.series.entry(key).or_default();

        if let Some(last) = series.last_mut() {
            if candle.timestamp_ms == last.timestamp_ms {
                *last = candle;
                return Ok(());
            }
            if candle.timestamp_ms < last.timestamp_ms {
                return Err(SimulationError::MatchingInvariant(format!(
                    "candle append out of order for {}/{} {}: {} < {}",
                    exchange, symbol, timeframe, candle.timestamp_ms, last.timestamp_ms
                )));
            }
        }
        series.push(candle);
        Ok(())
    }

    pub fn current_candle(&self, exchange: &str, symbol: &str, timeframe: Timeframe) -> Option<&Candle> {
        self.series
            .get(&(exchange.to_string(), symbol.to_string(), timeframe))
            .and_then(|s| s.last())
    }

    pub fn candles(&self, exchange: &str, symbol: &str, timeframe: Timeframe) -> &[Candle] {
        self.series
            .get(&(exchange.to_string(), symbol.to_string(), timeframe))
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(ts: i64, close: f64) -> Candle {
        Candle::new(ts, close, close, close, close, 1.0)
    }

    #[test]
    fn appends_new_timestamps() {
        let mut store = CandleStore::new();
        store
            .add_candle("binance", "BTC-USDT", Timeframe::OneMin, c(0, 100.0))
            .unwrap();
        store
            .add_candle("binance", "BTC-USDT", Timeframe::OneMin, c(60_000, 101.0))
            .unwrap();
        assert_eq!(store.candles("binance", "BTC-USDT", Timeframe::OneMin).len(), 2);
    }

    #[test]
    fn overwrites_same_timestamp_tail() {
        let mut store = CandleStore::new();
        store
            .add_candle("binance", "BTC-USDT", Timeframe::OneMin, c(0, 100.0))
            .unwrap();
        store
            .add_candle("binance", "BTC-USDT", Timeframe::OneMin, c(0, 98.0))
            .unwrap();
        let series = store.candles("binance", "BTC-USDT", Timeframe::OneMin);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].close, 98.0);
    }

    #[test]
    fn rejects_out_of_order_append() {
        let mut store = CandleStore::new();
        store
            .add_candle("binance", "BTC-USDT", Timeframe::OneMin, c(60_000, 100.0))
            .unwrap();
        let err = store.add_candle("binance", "BTC-USDT", Timeframe::OneMin, c(0, 99.0));
        assert!(err.is_err());
    }
}

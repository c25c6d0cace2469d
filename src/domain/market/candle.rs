use crate::domain::errors::SimulationError;
use serde::{Deserialize, Serialize};

/// A single OHLCV candle. `timestamp_ms` is UTC milliseconds, aligned to the
/// minute boundary for 1-minute candles and to the opening minute for
/// higher-timeframe candles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `low <= min(open,close) <= max(open,close) <= high`, `volume >= 0`.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let lo = self.open.min(self.close);
        let hi = self.open.max(self.close);
        if self.low > lo || hi > self.high || self.low > self.high || self.volume < 0.0 {
            return Err(SimulationError::InvalidCandle {
                timestamp_ms: self.timestamp_ms,
                reason: format!(
                    "o={} h={} l={} c={} v={} violates low<=min(o,c)<=max(o,c)<=high, volume>=0",
                    self.open, self.high, self.low, self.close, self.volume
                ),
            });
        }
        Ok(())
    }

    /// Whether `price` falls within this candle's intracandle range, inclusive.
    pub fn contains_price(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}
